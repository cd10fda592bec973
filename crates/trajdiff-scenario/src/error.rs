//! Error types for trajdiff-scenario.

use trajdiff_io::IoError;

/// Errors from scenario configuration, replay and metrics export.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// Returned when control stage triggers are not strictly increasing.
    #[error("control stage {index} triggers at {trigger} m, not after {previous} m")]
    UnorderedTriggers {
        /// Position of the offending stage.
        index: usize,
        /// Trigger of the preceding stage.
        previous: f64,
        /// The offending trigger.
        trigger: f64,
    },

    /// Returned when a trigger distance is NaN or infinite.
    #[error("control stage {index} has non-finite trigger")]
    NonFiniteTrigger {
        /// Position of the offending stage.
        index: usize,
    },

    /// Returned when the green radius exceeds the yellow radius, or either is
    /// not positive and finite.
    #[error("invalid traffic light radii: yellow within {yellow} m, green within {green} m")]
    InvalidLightRule {
        /// Yellow radius.
        yellow: f64,
        /// Green radius.
        green: f64,
    },

    /// Returned when replay inputs have different lengths.
    #[error("replay trace has {velocities} velocities but {steps} time steps")]
    LengthMismatch {
        /// Number of velocity samples.
        velocities: usize,
        /// Number of time steps.
        steps: usize,
    },

    /// Returned when a replayed sample is negative or not finite.
    #[error("invalid replay sample at step {step}: {reason}")]
    InvalidSample {
        /// Zero-based step.
        step: usize,
        /// What was wrong.
        reason: &'static str,
    },

    /// Wraps a trace reading or file writing error.
    #[error(transparent)]
    Io(#[from] IoError),
}
