//! Per-tick kinematic metrics log.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};
use trajdiff_io::IoError;

use crate::actor::VehicleControl;
use crate::error::ScenarioError;

/// File name used by [`MetricsLog::export`].
pub const METRICS_FILE: &str = "logged_metrics.csv";

/// One actor's state at one simulation tick.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicSample {
    /// Blueprint identifier. Distance is accumulated per actor type.
    pub actor_type: String,
    /// Vehicle id in the traffic simulator.
    pub sumo_id: String,
    /// Speed, m/s.
    pub velocity: f64,
    /// Control applied at this tick.
    pub control: VehicleControl,
    /// Longitudinal acceleration component.
    pub acc_x: f64,
    /// Lateral acceleration component.
    pub acc_y: f64,
    /// Position x.
    pub loc_x: f64,
    /// Position y.
    pub loc_y: f64,
    /// Heading in degrees.
    pub heading: f64,
    /// Length of this tick in seconds.
    pub time_step: f64,
}

/// One exported line of the metrics log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRow {
    /// Blueprint identifier.
    pub actor_type: String,
    /// Vehicle id in the traffic simulator.
    pub sumo_id: String,
    /// Speed, m/s.
    pub velocity: f64,
    /// Distance accumulated by this actor type up to and including this tick.
    pub travelled_distance: f64,
    /// Throttle applied.
    pub throttle: f64,
    /// Steering applied, negative left.
    pub steer: f64,
    /// Brake applied.
    pub brake: f64,
    /// Magnitude of `(acc_x, acc_y)`.
    pub acceleration: f64,
    /// Longitudinal acceleration component.
    pub acc_x: f64,
    /// Lateral acceleration component.
    pub acc_y: f64,
    /// Position x.
    pub loc_x: f64,
    /// Position y.
    pub loc_y: f64,
    /// Heading in degrees.
    pub heading: f64,
    /// Length of this tick in seconds.
    pub time_step: f64,
}

/// Accumulates [`KinematicSample`]s into [`MetricsRow`]s.
///
/// The log is a value: [`record`][Self::record] consumes it and returns the
/// updated log, and [`finalize`][Self::finalize] or
/// [`export`][Self::export] end it.
#[derive(Debug, Clone, Default)]
pub struct MetricsLog {
    rows: Vec<MetricsRow>,
    travelled: HashMap<String, f64>,
}

impl MetricsLog {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `sample`. Its travelled distance is the actor's previous
    /// distance plus `velocity * time_step`.
    #[must_use]
    pub fn record(mut self, sample: KinematicSample) -> Self {
        let travelled = self.travelled.entry(sample.actor_type.clone()).or_insert(0.0);
        *travelled += sample.velocity * sample.time_step;
        let travelled_distance = *travelled;

        self.rows.push(MetricsRow {
            actor_type: sample.actor_type,
            sumo_id: sample.sumo_id,
            velocity: sample.velocity,
            travelled_distance,
            throttle: sample.control.throttle,
            steer: sample.control.steer,
            brake: sample.control.brake,
            acceleration: sample.acc_x.hypot(sample.acc_y),
            acc_x: sample.acc_x,
            acc_y: sample.acc_y,
            loc_x: sample.loc_x,
            loc_y: sample.loc_y,
            heading: sample.heading,
            time_step: sample.time_step,
        });
        self
    }

    /// Rows recorded so far.
    #[must_use]
    pub fn rows(&self) -> &[MetricsRow] {
        &self.rows
    }

    /// Number of recorded rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Return true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distance travelled so far by `actor_type`, if it was recorded.
    #[must_use]
    pub fn travelled(&self, actor_type: &str) -> Option<f64> {
        self.travelled.get(actor_type).copied()
    }

    /// Close the log and return its rows.
    #[must_use]
    pub fn finalize(self) -> Vec<MetricsRow> {
        self.rows
    }

    /// Close the log and write it to `dir/logged_metrics.csv`, creating
    /// `dir` if needed.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::OutputDirCreate`] | `dir` cannot be created |
    /// | [`IoError::CsvWrite`] | The file cannot be created or a row fails to serialize |
    /// | [`IoError::WriteFile`] | Flushing the file fails |
    #[instrument(skip_all, fields(dir = %dir.display(), rows = self.rows.len()))]
    pub fn export(self, dir: &Path) -> Result<PathBuf, ScenarioError> {
        fs::create_dir_all(dir).map_err(|e| IoError::OutputDirCreate {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = dir.join(METRICS_FILE);
        let csv_err = |e: csv::Error| IoError::CsvWrite {
            path: path.clone(),
            source: e,
        };

        let mut wtr = csv::Writer::from_path(&path).map_err(csv_err)?;
        for row in self.finalize() {
            wtr.serialize(row).map_err(csv_err)?;
        }
        wtr.flush().map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        debug!("metrics log flushed");
        info!(path = %path.display(), "metrics log written");
        Ok(path)
    }
}
