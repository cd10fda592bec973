//! Error types for trajdiff-metrics.

use trajdiff_dtw::{DtwError, ResampleError, SignalError};

use crate::report::FailureKind;

/// Errors from discrepancy metrics, the phase search and engine setup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricError {
    /// Returned when the normalizing sum `Σ|B[j]|` along the path is
    /// numerically zero.
    #[error("reference magnitude along the warp path is zero ({denominator:e})")]
    ZeroReference {
        /// The offending denominator.
        denominator: f64,
    },

    /// Returned when two sequences that must have equal length do not.
    #[error("sequence lengths differ: {a} vs {b}")]
    LengthMismatch {
        /// Length of the first sequence.
        a: usize,
        /// Length of the second sequence.
        b: usize,
    },

    /// Returned when a warp path step indexes past the end of a sequence.
    #[error("warp step ({a}, {b}) out of bounds for sequences of length {len_a} and {len_b}")]
    PathOutOfBounds {
        /// Index into the first sequence.
        a: usize,
        /// Index into the second sequence.
        b: usize,
        /// Length of the first sequence.
        len_a: usize,
        /// Length of the second sequence.
        len_b: usize,
    },

    /// Returned when the phase sensitivity `r` is zero.
    #[error("phase sensitivity r must be non-zero")]
    ZeroSensitivity,

    /// Returned when a hyperparameter range is malformed.
    #[error("invalid parameter range: {reason}")]
    InvalidRange {
        /// Human-readable description of the problem.
        reason: &'static str,
    },

    /// Returned when a source name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid source name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidSourceId {
        /// The invalid name.
        name: String,
    },

    /// Returned when the requested reference source is not among the inputs.
    #[error("reference source \"{name}\" not found")]
    UnknownSource {
        /// The missing source name.
        name: String,
    },

    /// Returned when the same source name is supplied twice.
    #[error("duplicate source \"{name}\"")]
    DuplicateSource {
        /// The duplicated name.
        name: String,
    },

    /// Returned when fewer than two sources are supplied.
    #[error("need at least 2 sources to compare, got {count}")]
    TooFewSources {
        /// Number of sources supplied.
        count: usize,
    },

    /// Wraps an error from the alignment primitives.
    #[error(transparent)]
    Dtw(#[from] DtwError),
}

/// Any failure of a single `(quantity, pair)` comparison.
///
/// Every variant maps onto one [`FailureKind`] through [`kind`](Self::kind).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComparisonError {
    /// A required column was missing, empty or malformed.
    #[error("{0}")]
    DataFormat(String),

    /// Timestamps and values could not form a signal.
    #[error(transparent)]
    Signal(#[from] SignalError),

    /// The reference grid fell outside a source's time domain.
    #[error(transparent)]
    Resample(#[from] ResampleError),

    /// A sequence was rejected by the aligner.
    #[error(transparent)]
    Dtw(#[from] DtwError),

    /// A metric could not be computed.
    #[error(transparent)]
    Metric(#[from] MetricError),
}

impl ComparisonError {
    /// Classify this error.
    ///
    /// | Variant | Kind |
    /// |---|---|
    /// | `DataFormat`, `Signal` | [`FailureKind::DataFormat`] |
    /// | `Resample::OutOfDomain` | [`FailureKind::Domain`] |
    /// | `Resample::InvalidGrid`, `Dtw` | [`FailureKind::InvalidInput`] |
    /// | `Metric::ZeroReference` | [`FailureKind::DivisionByZero`] |
    /// | any other `Metric` | [`FailureKind::InvalidInput`] |
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::DataFormat(_) | Self::Signal(_) => FailureKind::DataFormat,
            Self::Resample(ResampleError::OutOfDomain { .. }) => FailureKind::Domain,
            Self::Resample(_) | Self::Dtw(_) => FailureKind::InvalidInput,
            Self::Metric(MetricError::ZeroReference { .. }) => FailureKind::DivisionByZero,
            Self::Metric(_) => FailureKind::InvalidInput,
        }
    }
}
