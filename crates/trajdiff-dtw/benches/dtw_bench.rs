//! Criterion benchmarks for trajdiff-dtw: full-table alignment and resampling.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use trajdiff_dtw::{Aligner, DerivativeMismatch, Signal, SquaredDifference, TimeSeries};

fn make_trace(n: usize, offset: f64) -> TimeSeries {
    let values: Vec<f64> = (0..n).map(|i| (i as f64 * 0.05).sin() * 10.0 + offset).collect();
    TimeSeries::new(values).unwrap()
}

fn bench_align(c: &mut Criterion) {
    let mut group = c.benchmark_group("dtw_align");
    for &len in &[100usize, 400, 1000] {
        let a = make_trace(len, 0.0);
        let b = make_trace(len, 0.5);

        group.bench_with_input(
            BenchmarkId::new("derivative_mismatch", len),
            &(&a, &b),
            |bencher, (a, b)| {
                let aligner = Aligner::new(DerivativeMismatch);
                bencher.iter(|| aligner.align(a.as_view(), b.as_view()));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("squared_difference", len),
            &(&a, &b),
            |bencher, (a, b)| {
                let aligner = Aligner::new(SquaredDifference);
                bencher.iter(|| aligner.align(a.as_view(), b.as_view()));
            },
        );
    }
    group.finish();
}

fn bench_resample(c: &mut Criterion) {
    let source = Signal::uniform(0.0, 0.023, make_trace(4000, 0.0).into_inner()).unwrap();
    let grid: Vec<f64> = (0..400).map(|k| k as f64 * 0.23).collect();

    c.bench_function("resample_4000_onto_400", |b| {
        b.iter(|| source.resample(&grid).unwrap());
    });
}

criterion_group!(benches, bench_align, bench_resample);
criterion_main!(benches);
