//! Builds per-source signal bundles from a manifest entry.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};
use trajdiff_dtw::Signal;
use trajdiff_metrics::{ComparisonError, Quantity, SourceId, SourceTrace};

use crate::IoError;
use crate::heading::correct_headings;
use crate::manifest::{SourceManifest, SourceSpec, TimeAxis};
use crate::reader::{TraceReader, TraceTable};

/// Accepted column names for `quantity`, in preference order.
#[must_use]
pub fn column_aliases(quantity: Quantity) -> &'static [&'static str] {
    match quantity {
        Quantity::Speed => &["speed", "velocity"],
        Quantity::Heading => &["heading", "angle"],
        Quantity::X => &["x", "loc_x"],
        Quantity::Y => &["y", "loc_y"],
    }
}

/// Accepted absolute-timestamp column names.
pub const TIME_ALIASES: &[&str] = &["time", "timestamp"];

/// Loads one [`SourceSpec`] into a [`SourceTrace`].
///
/// Loading never fails as a whole once the source name is valid: an
/// unreadable file or a missing column is stored as the failure of each
/// quantity that could not be found.
pub struct SourceLoader<'a> {
    spec: &'a SourceSpec,
}

impl<'a> SourceLoader<'a> {
    /// Create a loader for `spec`.
    pub fn new(spec: &'a SourceSpec) -> Self {
        Self { spec }
    }

    /// Read every file and extract every quantity.
    ///
    /// # Errors
    ///
    /// [`IoError::Source`] if the source name is not `[a-zA-Z0-9_-]+`.
    #[instrument(skip(self), fields(source = %self.spec.name, n_files = self.spec.files.len()))]
    pub fn load(&self) -> Result<SourceTrace, IoError> {
        let id = SourceId::new(self.spec.name.as_str())?;
        let tables: Vec<Result<TraceTable, IoError>> = self
            .spec
            .files
            .iter()
            .map(|path| self.read_table(path))
            .collect();

        let mut trace = SourceTrace::new(id);
        let mut loaded = 0usize;
        for quantity in Quantity::ALL {
            let result = self.extract(&tables, quantity);
            match &result {
                Ok(signal) => {
                    loaded += 1;
                    info!(%quantity, samples = signal.len(), "signal loaded");
                }
                Err(e) => warn!(%quantity, error = %e, "signal unavailable"),
            }
            trace = trace.with_result(quantity, result.map_err(ComparisonError::from));
        }
        info!(loaded, "source loaded");
        Ok(trace)
    }

    fn read_table(&self, path: &Path) -> Result<TraceTable, IoError> {
        let table = TraceReader::new(path).read()?;
        match &self.spec.filter {
            Some(filter) => table.filter_eq(&filter.column, &filter.value),
            None => Ok(table),
        }
    }

    fn extract(
        &self,
        tables: &[Result<TraceTable, IoError>],
        quantity: Quantity,
    ) -> Result<Signal, IoError> {
        let aliases = column_aliases(quantity);
        let Some(table) = tables
            .iter()
            .filter_map(|t| t.as_ref().ok())
            .find(|t| t.find_column(aliases).is_some())
        else {
            // Prefer reporting an unreadable file over a missing column: the
            // column may well live in that file.
            return Err(match tables.iter().find_map(|t| t.as_ref().err()) {
                Some(e) => IoError::Unavailable {
                    quantity,
                    cause: e.to_string(),
                },
                None => IoError::MissingColumn {
                    path: self.files_label(),
                    aliases: aliases.join(", "),
                },
            });
        };

        let mut values = table.column(aliases)?;
        match quantity {
            Quantity::Heading if self.spec.heading_correction => correct_headings(&mut values),
            Quantity::X => {
                if let Some(frame) = &self.spec.frame {
                    values.iter_mut().for_each(|x| *x = frame.apply_x(*x));
                }
            }
            Quantity::Y => {
                if let Some(frame) = &self.spec.frame {
                    values.iter_mut().for_each(|y| *y = frame.apply_y(*y));
                }
            }
            _ => {}
        }

        let signal = match &self.spec.time {
            TimeAxis::Column { name } => {
                let times = match name {
                    Some(name) => table.column(&[name.as_str()])?,
                    None => table.column(TIME_ALIASES)?,
                };
                Signal::new(times, values)
            }
            TimeAxis::Uniform { dt, start } => Signal::uniform(*start, *dt, values),
            TimeAxis::Deltas { column, start } => {
                Signal::from_deltas(*start, &table.column(&[column.as_str()])?, values)
            }
        };
        signal.map_err(|source| IoError::Signal {
            path: table.path().to_path_buf(),
            quantity,
            source,
        })
    }

    fn files_label(&self) -> PathBuf {
        let names: Vec<String> = self
            .spec
            .files
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        PathBuf::from(names.join(", "))
    }
}

/// Load every source of `manifest`, in manifest order.
///
/// # Errors
///
/// [`IoError::Source`] if a source name is invalid.
pub fn load_sources(manifest: &SourceManifest) -> Result<Vec<SourceTrace>, IoError> {
    manifest
        .sources
        .iter()
        .map(|spec| SourceLoader::new(spec).load())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use trajdiff_metrics::FailureKind;

    use crate::frame::FrameTransform;
    use crate::manifest::RowFilter;

    fn spec(dir: &TempDir, files: &[(&str, &str)], time: TimeAxis) -> SourceSpec {
        let paths = files
            .iter()
            .map(|(name, content)| {
                let path = dir.path().join(name);
                fs::write(&path, content).unwrap();
                path
            })
            .collect();
        SourceSpec {
            name: "src".into(),
            files: paths,
            time,
            heading_correction: false,
            frame: None,
            filter: None,
        }
    }

    #[test]
    fn single_file_with_time_column() {
        let dir = TempDir::new().unwrap();
        let spec = spec(
            &dir,
            &[("sumo.csv", "time,speed,heading,x,y\n0,0,90,1,2\n1,5,91,2,3\n2,10,92,3,4\n")],
            TimeAxis::Column { name: None },
        );
        let trace = SourceLoader::new(&spec).load().unwrap();
        let speed = trace.signal(Quantity::Speed).unwrap();
        assert_eq!(speed.times(), &[0.0, 1.0, 2.0]);
        assert_eq!(speed.values(), &[0.0, 5.0, 10.0]);
        assert_eq!(trace.signal(Quantity::Y).unwrap().values(), &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn split_files_uniform_time_heading_and_frame() {
        let dir = TempDir::new().unwrap();
        let mut spec = spec(
            &dir,
            &[
                ("speed.csv", "velocity\n1\n2\n"),
                ("heading.csv", "heading\n-95\n10\n"),
                ("traj.csv", "loc_x,loc_y\n0,0\n1,1\n"),
            ],
            TimeAxis::Uniform { dt: 0.23, start: 0.0 },
        );
        spec.heading_correction = true;
        spec.frame = Some(FrameTransform::new(503.02, 423.76, true));
        let trace = SourceLoader::new(&spec).load().unwrap();

        assert_eq!(trace.signal(Quantity::Speed).unwrap().times(), &[0.0, 0.23]);
        assert_eq!(trace.signal(Quantity::Heading).unwrap().values(), &[355.0, 100.0]);
        let x = trace.signal(Quantity::X).unwrap().values().to_vec();
        let y = trace.signal(Quantity::Y).unwrap().values().to_vec();
        assert!((x[1] - 504.02).abs() < 1e-9);
        assert!((y[1] - 422.76).abs() < 1e-9);
    }

    #[test]
    fn deltas_and_actor_filter() {
        let dir = TempDir::new().unwrap();
        let mut spec = spec(
            &dir,
            &[(
                "log.csv",
                "actor_type,velocity,time_step\nego,1,0.5\nnpc,7,0.5\nego,2,0.5\nego,3,0.5\n",
            )],
            TimeAxis::Deltas {
                column: "time_step".into(),
                start: 0.0,
            },
        );
        spec.filter = Some(RowFilter {
            column: "actor_type".into(),
            value: "ego".into(),
        });
        let trace = SourceLoader::new(&spec).load().unwrap();
        let speed = trace.signal(Quantity::Speed).unwrap();
        assert_eq!(speed.values(), &[1.0, 2.0, 3.0]);
        assert_eq!(speed.times(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn missing_quantities_are_isolated() {
        let dir = TempDir::new().unwrap();
        let spec = spec(&dir, &[("a.csv", "time,speed\n0,1\n1,2\n")], TimeAxis::Column { name: None });
        let trace = SourceLoader::new(&spec).load().unwrap();
        assert!(trace.signal(Quantity::Speed).is_ok());
        for q in [Quantity::Heading, Quantity::X, Quantity::Y] {
            let failure = trace.signal(q).unwrap_err();
            assert_eq!(failure.kind, FailureKind::DataFormat);
            assert!(failure.message.contains("missing column"), "{}", failure.message);
        }
    }

    #[test]
    fn unreadable_file_reported_for_unfound_quantities() {
        let dir = TempDir::new().unwrap();
        let mut spec = spec(&dir, &[("a.csv", "speed\n1\n")], TimeAxis::Uniform { dt: 1.0, start: 0.0 });
        spec.files.push(dir.path().join("missing.csv"));
        let trace = SourceLoader::new(&spec).load().unwrap();
        assert!(trace.signal(Quantity::Speed).is_ok());
        let failure = trace.signal(Quantity::Heading).unwrap_err();
        assert!(failure.message.contains("file not found"), "{}", failure.message);
    }

    #[test]
    fn non_increasing_timestamps_fail_that_quantity() {
        let dir = TempDir::new().unwrap();
        let spec = spec(&dir, &[("a.csv", "time,speed\n0,1\n0,2\n")], TimeAxis::Column { name: None });
        let trace = SourceLoader::new(&spec).load().unwrap();
        assert_eq!(trace.signal(Quantity::Speed).unwrap_err().kind, FailureKind::DataFormat);
    }

    #[test]
    fn invalid_source_name() {
        let dir = TempDir::new().unwrap();
        let mut spec = spec(&dir, &[("a.csv", "speed\n1\n")], TimeAxis::Uniform { dt: 1.0, start: 0.0 });
        spec.name = "bad name".into();
        assert!(matches!(SourceLoader::new(&spec).load(), Err(IoError::Source(_))));
    }
}
