//! End-to-end checks of the comparison engine on small hand-built traces.

use trajdiff_dtw::{Aligner, DerivativeMismatch, PositionTerm, Signal, TimeSeries};
use trajdiff_metrics::{
    AnalysisConfig, FailureKind, GridStrategy, ParamRange, PhaseSearchConfig, Quantity, SourceId,
    SourceTrace, magnitude_error, phase_error, topology_error,
};

fn trace(name: &str, signals: &[(Quantity, Signal)]) -> SourceTrace {
    signals.iter().fold(
        SourceTrace::new(SourceId::new(name).unwrap()),
        |trace, (q, s)| trace.with_signal(*q, s.clone()),
    )
}

fn wave(n: usize, phase: f64) -> Vec<f64> {
    (0..n).map(|k| 10.0 + (k as f64 * 0.3 + phase).sin()).collect()
}

// ---------------------------------------------------------------------------
// Self-comparison
// ---------------------------------------------------------------------------

#[test]
fn signal_against_itself_scores_zero_everywhere() {
    let values = TimeSeries::new(wave(30, 0.0)).unwrap();
    let alignment = Aligner::new(DerivativeMismatch).align(values.as_view(), values.as_view());
    let v = values.as_ref();
    assert_eq!(alignment.cost.value(), 0.0);
    assert_eq!(magnitude_error(v, v, &alignment.path).unwrap(), 0.0);
    assert_eq!(topology_error(v, v, &alignment.path).unwrap(), 0.0);

    for r in [0.5, 1.0, 7.0, 60.0] {
        let est = phase_error(v, v, 0.0, r).unwrap();
        assert_eq!(est.shift, 0);
        assert_eq!(est.error, 1.0);
    }
}

// ---------------------------------------------------------------------------
// Three-source scenario
// ---------------------------------------------------------------------------

#[test]
fn three_sources_speed_ramp() {
    // Reference at 1 s, 3D simulator at 0.25 s, co-simulation at 0.5 s. All
    // describe the same ramp, so resampling recovers it exactly.
    let sumo = Signal::new(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 5.0, 10.0, 15.0]).unwrap();
    let carla_t: Vec<f64> = (0..=12).map(|k| k as f64 * 0.25).collect();
    let carla = Signal::new(carla_t.clone(), carla_t.iter().map(|t| 5.0 * t).collect()).unwrap();
    let cosim_v: Vec<f64> = (0..7).map(|k| 2.5 * k as f64).collect();
    let cosim = Signal::from_deltas(0.0, &[0.5; 7], cosim_v).unwrap();

    let sources = [
        trace("carla", &[(Quantity::Speed, carla)]),
        trace("sumo", &[(Quantity::Speed, sumo)]),
        trace("cosim", &[(Quantity::Speed, cosim)]),
    ];
    let report = AnalysisConfig::default().run("sumo", &sources).unwrap();

    for (first, second) in [("carla", "sumo"), ("carla", "cosim"), ("sumo", "cosim")] {
        let row = report.row(Quantity::Speed, first, second).unwrap();
        let d = row.discrepancy.as_ref().unwrap();
        assert!(d.dtw_distance.value().abs() < 1e-9, "{first}-{second}");
        assert!(d.magnitude_error.abs() < 1e-12);
        assert!(d.topology_error.abs() < 1e-12);
        assert_eq!(d.path_len, 4);
        assert_eq!(row.phase.as_ref().unwrap().shift, 0);
    }
    // Heading, x, y were never loaded: 3 pairs x 3 quantities x 2 metrics.
    assert_eq!(report.failure_count(), 18);
    assert!(
        report
            .rows()
            .iter()
            .filter(|r| r.quantity != Quantity::Speed)
            .all(|r| r.discrepancy.as_ref().unwrap_err().kind == FailureKind::DataFormat)
    );
}

#[test]
fn delayed_source_reports_positive_shift() {
    let t: Vec<f64> = (0..40).map(|k| k as f64).collect();
    let mut pulse = vec![0.0; 40];
    pulse[10] = 1.0;
    let mut delayed = vec![0.0; 40];
    delayed[14] = 1.0;

    let sources = [
        trace("late", &[(Quantity::X, Signal::new(t.clone(), delayed).unwrap())]),
        trace("ref", &[(Quantity::X, Signal::new(t, pulse).unwrap())]),
    ];
    let phase = PhaseSearchConfig::new(
        ParamRange::single(20.0).unwrap(),
        ParamRange::single(10.0).unwrap(),
    )
    .unwrap();
    let report = AnalysisConfig::default()
        .with_phase_search(phase)
        .run("ref", &sources)
        .unwrap();

    let fit = report.row(Quantity::X, "late", "ref").unwrap().phase.clone().unwrap();
    assert_eq!(fit.shift, 4);
    assert!((fit.error - (-1.6f64).exp()).abs() < 1e-15);
}

#[test]
fn timestamp_positions_and_sample_count_grid_run() {
    let a = Signal::uniform(0.0, 0.5, wave(20, 0.0)).unwrap();
    let b = Signal::uniform(0.0, 0.25, wave(39, 0.2)).unwrap();
    let sources = [
        trace("a", &[(Quantity::Heading, a)]),
        trace("b", &[(Quantity::Heading, b)]),
    ];
    let config = AnalysisConfig::default()
        .with_position_term(PositionTerm::Timestamp)
        .with_grid_strategy(GridStrategy::SampleCount);
    let report = config.run("a", &sources).unwrap();
    let row = report.row(Quantity::Heading, "a", "b").unwrap();
    let d = row.discrepancy.as_ref().unwrap();
    assert!(d.dtw_distance.value() >= 0.0);
    assert!(d.path_len >= 20 && d.path_len <= 39);
}
