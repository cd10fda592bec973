//! Report and fused-dataset writers.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};
use trajdiff_dtw::{CostModel, PositionTerm, Signal};
use trajdiff_metrics::{AlignedSet, AnalysisConfig, ErrorReport, Failure, GridStrategy, ParamRange};

use crate::IoError;
use crate::domain::ExperimentName;

/// Writes comparison results into one output directory.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_report.json`,
/// `{experiment}_discrepancy.csv`, `{experiment}_phase.csv` and
/// `{experiment}_fused.csv`.
pub struct ReportWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ReportWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    fn path(&self, suffix: &str) -> PathBuf {
        self.output_dir.join(self.experiment.file_name(suffix))
    }

    /// Write the full report with its configuration to
    /// `{experiment}_report.json`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | The artifact cannot be encoded |
    /// | [`IoError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all)]
    pub fn write_report(
        &self,
        report: &ErrorReport,
        config: &AnalysisConfig,
    ) -> Result<PathBuf, IoError> {
        let path = self.path("report.json");
        let phase = config.phase_search();
        let artifact = ReportArtifact {
            experiment: self.experiment.as_str(),
            reference: report.reference().as_str(),
            sources: report.sources().iter().map(|s| s.as_str()).collect(),
            config: ConfigEntry {
                cost: match config.cost() {
                    CostModel::DerivativeMismatch => "derivative_mismatch",
                    CostModel::SquaredDifference => "squared_difference",
                },
                position_term: match config.position_term() {
                    PositionTerm::DpIndex => "index",
                    PositionTerm::Timestamp => "time",
                },
                grid: match config.grid_strategy() {
                    GridStrategy::ReferenceTimes => "reference",
                    GridStrategy::SampleCount => "sample-count",
                },
                c_range: RangeEntry::from(phase.c_range()),
                r_range: RangeEntry::from(phase.r_range()),
            },
            failures: report.failure_count(),
            rows: report
                .rows()
                .iter()
                .map(|row| RowEntry {
                    quantity: row.quantity.name(),
                    first: row.pair.first.as_str(),
                    second: row.pair.second.as_str(),
                    discrepancy: Outcome::from_result(row.discrepancy.as_ref().map(|d| {
                        DiscrepancyEntry {
                            dtw_distance: d.dtw_distance.value(),
                            magnitude_error: d.magnitude_error,
                            topology_error: d.topology_error,
                            path_len: d.path_len,
                        }
                    })),
                    phase: Outcome::from_result(row.phase.as_ref().map(|p| PhaseEntry {
                        c: p.c,
                        r: p.r,
                        shift: p.shift,
                        error: p.error,
                    })),
                })
                .collect(),
        };

        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "report written");
        Ok(path)
    }

    /// Write the discrepancy table to `{experiment}_discrepancy.csv`.
    ///
    /// Failed rows leave the metric cells blank and fill `failure`.
    ///
    /// # Errors
    ///
    /// [`IoError::CsvWrite`] if the file cannot be created or written.
    #[instrument(skip_all)]
    pub fn write_discrepancy_csv(&self, report: &ErrorReport) -> Result<PathBuf, IoError> {
        let path = self.path("discrepancy.csv");
        let rows = report.rows().iter().map(|row| {
            let d = row.discrepancy.as_ref().ok();
            DiscrepancyCsvRow {
                quantity: row.quantity.name(),
                first: row.pair.first.as_str(),
                second: row.pair.second.as_str(),
                dtw_distance: d.map(|d| d.dtw_distance.value()),
                magnitude_error: d.map(|d| d.magnitude_error),
                topology_error: d.map(|d| d.topology_error),
                path_len: d.map(|d| d.path_len),
                failure: failure_cell(row.discrepancy.as_ref().err()),
            }
        });
        write_csv(&path, rows)?;
        info!(path = %path.display(), "discrepancy table written");
        Ok(path)
    }

    /// Write the phase-error table to `{experiment}_phase.csv`.
    ///
    /// # Errors
    ///
    /// [`IoError::CsvWrite`] if the file cannot be created or written.
    #[instrument(skip_all)]
    pub fn write_phase_csv(&self, report: &ErrorReport) -> Result<PathBuf, IoError> {
        let path = self.path("phase.csv");
        let rows = report.rows().iter().map(|row| {
            let p = row.phase.as_ref().ok();
            PhaseCsvRow {
                quantity: row.quantity.name(),
                first: row.pair.first.as_str(),
                second: row.pair.second.as_str(),
                c: p.map(|p| p.c),
                r: p.map(|p| p.r),
                shift: p.map(|p| p.shift),
                phase_error: p.map(|p| p.error),
                failure: failure_cell(row.phase.as_ref().err()),
            }
        });
        write_csv(&path, rows)?;
        info!(path = %path.display(), "phase table written");
        Ok(path)
    }

    /// Write the resampled signals to `{experiment}_fused.csv`.
    ///
    /// Columns are `quantity`, `time` (the reference grid), one value column
    /// per source, then one `{source}_time` column per source holding the
    /// timestamp that source was sampled at. Rows are index-aligned: under
    /// [`GridStrategy::SampleCount`] each source spans its own time range,
    /// so `{source}_time` can differ from `time`. A source that could not be resampled for a quantity leaves
    /// its cells blank; a quantity without a reference grid is skipped.
    ///
    /// # Errors
    ///
    /// [`IoError::CsvWrite`] if the file cannot be created or written.
    #[instrument(skip_all)]
    pub fn write_fused(&self, aligned: &AlignedSet) -> Result<PathBuf, IoError> {
        let path = self.path("fused.csv");
        let csv_err = |e: csv::Error| IoError::CsvWrite {
            path: path.clone(),
            source: e,
        };
        let mut wtr = csv::Writer::from_path(&path).map_err(csv_err)?;

        let mut header = vec!["quantity".to_string(), "time".to_string()];
        header.extend(aligned.sources().iter().map(|s| s.to_string()));
        header.extend(aligned.sources().iter().map(|s| format!("{s}_time")));
        wtr.write_record(&header).map_err(csv_err)?;

        let mut n_rows = 0usize;
        for aq in aligned.quantities() {
            let Ok(grid) = &aq.grid else { continue };
            for (k, t) in grid.iter().enumerate() {
                let mut record = vec![aq.quantity.name().to_string(), t.to_string()];
                for column in [Signal::values as fn(&Signal) -> &[f64], Signal::times] {
                    record.extend(aq.signals.iter().map(|(_, signal)| match signal {
                        Ok(s) => column(s).get(k).map_or_else(String::new, f64::to_string),
                        Err(_) => String::new(),
                    }));
                }
                wtr.write_record(&record).map_err(csv_err)?;
                n_rows += 1;
            }
        }
        wtr.flush().map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), n_rows, "fused dataset written");
        Ok(path)
    }
}

fn failure_cell(failure: Option<&Failure>) -> Option<String> {
    failure.map(ToString::to_string)
}

fn write_csv<T: Serialize>(path: &Path, rows: impl Iterator<Item = T>) -> Result<(), IoError> {
    let csv_err = |e: csv::Error| IoError::CsvWrite {
        path: path.to_path_buf(),
        source: e,
    };
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    for row in rows {
        wtr.serialize(row).map_err(csv_err)?;
    }
    wtr.flush().map_err(|e| IoError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

// --- Shadow structs for serialization ---

#[derive(Serialize)]
struct ReportArtifact<'a> {
    experiment: &'a str,
    reference: &'a str,
    sources: Vec<&'a str>,
    config: ConfigEntry,
    failures: usize,
    rows: Vec<RowEntry<'a>>,
}

#[derive(Serialize)]
struct ConfigEntry {
    cost: &'static str,
    position_term: &'static str,
    grid: &'static str,
    c_range: RangeEntry,
    r_range: RangeEntry,
}

#[derive(Serialize)]
struct RangeEntry {
    start: f64,
    end: f64,
    steps: usize,
}

impl From<ParamRange> for RangeEntry {
    fn from(range: ParamRange) -> Self {
        Self {
            start: range.start(),
            end: range.end(),
            steps: range.steps(),
        }
    }
}

#[derive(Serialize)]
struct RowEntry<'a> {
    quantity: &'static str,
    first: &'a str,
    second: &'a str,
    discrepancy: Outcome<'a, DiscrepancyEntry>,
    phase: Outcome<'a, PhaseEntry>,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Outcome<'a, T> {
    Ok(T),
    Failed { kind: &'static str, message: &'a str },
}

impl<'a, T> Outcome<'a, T> {
    fn from_result(result: Result<T, &'a Failure>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(f) => Self::Failed {
                kind: f.kind.name(),
                message: &f.message,
            },
        }
    }
}

#[derive(Serialize)]
struct DiscrepancyEntry {
    dtw_distance: f64,
    magnitude_error: f64,
    topology_error: f64,
    path_len: usize,
}

#[derive(Serialize)]
struct PhaseEntry {
    c: f64,
    r: f64,
    shift: i64,
    error: f64,
}

#[derive(Serialize)]
struct DiscrepancyCsvRow<'a> {
    quantity: &'static str,
    first: &'a str,
    second: &'a str,
    dtw_distance: Option<f64>,
    magnitude_error: Option<f64>,
    topology_error: Option<f64>,
    path_len: Option<usize>,
    failure: Option<String>,
}

#[derive(Serialize)]
struct PhaseCsvRow<'a> {
    quantity: &'static str,
    first: &'a str,
    second: &'a str,
    c: Option<f64>,
    r: Option<f64>,
    shift: Option<i64>,
    phase_error: Option<f64>,
    failure: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use trajdiff_metrics::{Quantity, SourceId, SourceTrace};

    fn sources() -> Vec<SourceTrace> {
        let t = vec![0.0, 1.0, 2.0, 3.0];
        let v = vec![0.0, 5.0, 10.0, 15.0];
        vec![
            SourceTrace::new(SourceId::new("sumo").unwrap())
                .with_signal(Quantity::Speed, Signal::new(t.clone(), v.clone()).unwrap()),
            SourceTrace::new(SourceId::new("carla").unwrap())
                .with_signal(Quantity::Speed, Signal::new(t, v).unwrap()),
        ]
    }

    fn writer(dir: &TempDir) -> ReportWriter {
        ReportWriter::new(dir.path(), ExperimentName::new("unit").unwrap()).unwrap()
    }

    #[test]
    fn report_json_structure() {
        let dir = TempDir::new().unwrap();
        let config = AnalysisConfig::default();
        let report = config.run("sumo", &sources()).unwrap();
        let path = writer(&dir).write_report(&report, &config).unwrap();
        assert_eq!(path, dir.path().join("unit_report.json"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["experiment"], "unit");
        assert_eq!(json["reference"], "sumo");
        assert_eq!(json["config"]["position_term"], "index");
        assert_eq!(json["config"]["c_range"]["steps"], 100);
        let rows = json["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0]["quantity"], "speed");
        assert_eq!(rows[0]["discrepancy"]["status"], "ok");
        assert_eq!(rows[0]["discrepancy"]["dtw_distance"], 0.0);
        assert_eq!(rows[0]["phase"]["shift"], 0);
        assert_eq!(rows[1]["discrepancy"]["status"], "failed");
        assert_eq!(rows[1]["discrepancy"]["kind"], "DataFormatError");
        assert_eq!(json["failures"], 6);
    }

    #[test]
    fn csv_tables_have_one_row_per_unit() {
        let dir = TempDir::new().unwrap();
        let report = AnalysisConfig::default().run("sumo", &sources()).unwrap();
        let w = writer(&dir);

        let text = fs::read_to_string(w.write_discrepancy_csv(&report).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "quantity,first,second,dtw_distance,magnitude_error,topology_error,path_len,failure"
        );
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("speed,sumo,carla,0.0,0.0,0.0,4,"));
        assert!(lines[2].starts_with("heading,sumo,carla,,,,,"));

        let text = fs::read_to_string(w.write_phase_csv(&report).unwrap()).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, "quantity,first,second,c,r,shift,phase_error,failure");
    }

    #[test]
    fn fused_dataset_layout() {
        let dir = TempDir::new().unwrap();
        let aligned = AnalysisConfig::default().align_sources("sumo", &sources()).unwrap();
        let path = writer(&dir).write_fused(&aligned).unwrap();
        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "quantity,time,sumo,carla,sumo_time,carla_time");
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[2], "speed,1,5,5,1,1");
    }

    #[test]
    fn stretched_sources_keep_their_own_times() {
        let dir = TempDir::new().unwrap();
        let mut traces = sources();
        traces[1] = SourceTrace::new(SourceId::new("carla").unwrap()).with_signal(
            Quantity::Speed,
            Signal::new(vec![0.0, 2.0, 4.0, 6.0], vec![0.0, 5.0, 10.0, 15.0]).unwrap(),
        );
        let aligned = AnalysisConfig::default()
            .with_grid_strategy(GridStrategy::SampleCount)
            .align_sources("sumo", &traces)
            .unwrap();
        let text = fs::read_to_string(writer(&dir).write_fused(&aligned).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // Row 1 pairs sumo at t = 1 with carla at t = 2.
        assert_eq!(lines[2], "speed,1,5,5,1,2");
        assert_eq!(lines[4], "speed,3,15,15,3,6");
    }

    #[test]
    fn creates_nested_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        ReportWriter::new(&nested, ExperimentName::new("x").unwrap()).unwrap();
        assert!(nested.is_dir());
    }
}
