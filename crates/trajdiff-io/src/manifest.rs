//! JSON description of the sources to compare.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::IoError;
use crate::frame::FrameTransform;

/// Top-level manifest: which sources to load and which one provides the
/// reference grid.
///
/// ```json
/// {
///   "reference": "sumo",
///   "sources": [
///     { "name": "sumo", "files": ["sumo_logged.csv"], "time": { "kind": "column" } },
///     { "name": "carla",
///       "files": ["ego_speed_carla.csv", "ego_heading_carla.csv", "ego_trajec_carla.csv"],
///       "time": { "kind": "uniform", "dt": 0.23 },
///       "heading_correction": true,
///       "frame": { "x_offset": 503.02, "y_offset": 423.76, "flip_y": true } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceManifest {
    /// Name of the source whose timestamps form the comparison grid.
    pub reference: String,
    /// Sources in comparison order.
    pub sources: Vec<SourceSpec>,
}

/// One simulation source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSpec {
    /// Source name, `[a-zA-Z0-9_-]+`.
    pub name: String,
    /// CSV files holding the source's columns. For each quantity the first
    /// file with a matching column wins.
    pub files: Vec<PathBuf>,
    /// How sample timestamps are obtained.
    pub time: TimeAxis,
    /// Apply heading branch correction to the heading column.
    #[serde(default)]
    pub heading_correction: bool,
    /// Map `x`/`y` into the reference frame.
    #[serde(default)]
    pub frame: Option<FrameTransform>,
    /// Keep only rows matching this filter (e.g. the ego actor of a
    /// co-simulation log).
    #[serde(default)]
    pub filter: Option<RowFilter>,
}

/// Source of sample timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeAxis {
    /// Absolute timestamps in a column. Without a name, `time` or
    /// `timestamp` is used.
    Column {
        /// Column name.
        #[serde(default)]
        name: Option<String>,
    },
    /// Fixed sampling interval: sample `k` is at `start + k * dt`.
    Uniform {
        /// Sampling interval in seconds.
        dt: f64,
        /// Time of the first sample.
        #[serde(default)]
        start: f64,
    },
    /// Per-row tick durations in a column: sample `k` is at `start` plus
    /// the durations of the `k` ticks before it.
    Deltas {
        /// Column of tick durations.
        column: String,
        /// Time of the first sample.
        #[serde(default)]
        start: f64,
    },
}

/// Row selection on a text column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RowFilter {
    /// Column to test.
    pub column: String,
    /// Required cell value.
    pub value: String,
}

impl SourceManifest {
    /// Read a manifest from `path`. Relative file paths inside it are
    /// resolved against the manifest's directory.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::FileNotFound`] | Manifest is unreadable |
    /// | [`IoError::Manifest`] | Not valid JSON for the schema |
    /// | [`IoError::InvalidManifest`] | See [`validate`](Self::validate) |
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let text = fs::read_to_string(path).map_err(|e| IoError::FileNotFound {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut manifest: SourceManifest =
            serde_json::from_str(&text).map_err(|e| IoError::Manifest {
                path: path.to_path_buf(),
                source: e,
            })?;
        if let Some(base) = path.parent() {
            manifest.resolve_relative(base);
        }
        manifest.validate()?;
        debug!(n_sources = manifest.sources.len(), reference = %manifest.reference, "manifest parsed");
        Ok(manifest)
    }

    /// Join every relative file path onto `base`.
    pub fn resolve_relative(&mut self, base: &Path) {
        for spec in &mut self.sources {
            for file in &mut spec.files {
                if file.is_relative() {
                    *file = base.join(&*file);
                }
            }
        }
    }

    /// Check the structure the loader relies on.
    ///
    /// # Errors
    ///
    /// [`IoError::InvalidManifest`] if a source lists no files, a uniform
    /// interval is not positive and finite, or `reference` names no source.
    pub fn validate(&self) -> Result<(), IoError> {
        let invalid = |reason: String| Err(IoError::InvalidManifest { reason });
        for spec in &self.sources {
            if spec.files.is_empty() {
                return invalid(format!("source \"{}\" lists no files", spec.name));
            }
            if let TimeAxis::Uniform { dt, .. } = spec.time
                && !(dt.is_finite() && dt > 0.0)
            {
                return invalid(format!("source \"{}\" has sampling interval {dt}", spec.name));
            }
        }
        if !self.sources.iter().any(|s| s.name == self.reference) {
            return invalid(format!("reference \"{}\" is not a listed source", self.reference));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
        "reference": "sumo",
        "sources": [
            { "name": "sumo", "files": ["sumo.csv"], "time": { "kind": "column" } },
            { "name": "carla", "files": ["/abs/speed.csv", "traj.csv"],
              "time": { "kind": "uniform", "dt": 0.23 },
              "heading_correction": true,
              "frame": { "x_offset": 503.02, "y_offset": 423.76, "flip_y": true } },
            { "name": "cosim", "files": ["log.csv"],
              "time": { "kind": "deltas", "column": "time_step" },
              "filter": { "column": "actor_type", "value": "ego" } }
        ]
    }"#;

    fn write_manifest(dir: &TempDir, text: &str) -> PathBuf {
        let path = dir.path().join("manifest.json");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(text.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_all_time_axes() {
        let dir = TempDir::new().unwrap();
        let manifest = SourceManifest::from_path(&write_manifest(&dir, MANIFEST)).unwrap();
        assert_eq!(manifest.sources.len(), 3);
        assert_eq!(manifest.sources[0].time, TimeAxis::Column { name: None });
        assert_eq!(manifest.sources[1].time, TimeAxis::Uniform { dt: 0.23, start: 0.0 });
        assert_eq!(
            manifest.sources[2].time,
            TimeAxis::Deltas {
                column: "time_step".into(),
                start: 0.0,
            }
        );
        assert!(manifest.sources[1].heading_correction);
        assert!(!manifest.sources[0].heading_correction);
        assert_eq!(
            manifest.sources[2].filter,
            Some(RowFilter {
                column: "actor_type".into(),
                value: "ego".into()
            })
        );
    }

    #[test]
    fn relative_files_resolve_against_manifest_dir() {
        let dir = TempDir::new().unwrap();
        let manifest = SourceManifest::from_path(&write_manifest(&dir, MANIFEST)).unwrap();
        assert_eq!(manifest.sources[0].files[0], dir.path().join("sumo.csv"));
        assert_eq!(manifest.sources[1].files[0], PathBuf::from("/abs/speed.csv"));
    }

    #[test]
    fn unknown_reference_rejected() {
        let dir = TempDir::new().unwrap();
        let text = MANIFEST.replacen("\"reference\": \"sumo\"", "\"reference\": \"vissim\"", 1);
        let result = SourceManifest::from_path(&write_manifest(&dir, &text));
        assert!(matches!(result, Err(IoError::InvalidManifest { .. })));
    }

    #[test]
    fn bad_interval_rejected() {
        let dir = TempDir::new().unwrap();
        let text = MANIFEST.replacen("\"dt\": 0.23", "\"dt\": 0.0", 1);
        let result = SourceManifest::from_path(&write_manifest(&dir, &text));
        assert!(matches!(result, Err(IoError::InvalidManifest { .. })));
    }

    #[test]
    fn malformed_json_rejected() {
        let dir = TempDir::new().unwrap();
        let result = SourceManifest::from_path(&write_manifest(&dir, "{ \"reference\": 3 }"));
        assert!(matches!(result, Err(IoError::Manifest { .. })));
    }
}
