//! Error types for series validation, signal construction, resampling and alignment.

/// Errors from series validation and DTW alignment.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DtwError {
    /// Returned when an empty slice is offered as an alignment input.
    #[error("sequence must be non-empty")]
    EmptySeries,

    /// Returned when a sequence contains NaN or an infinity.
    #[error("sequence contains non-finite value at index {index}")]
    NonFiniteValue {
        /// Position of the first non-finite value.
        index: usize,
    },

    /// Returned when a warp path does not start at `(0, 0)`, is not made of
    /// unit monotone steps, or leaves the sequence bounds.
    #[error("invalid warp path: {reason}")]
    InvalidPath {
        /// What the path violated.
        reason: String,
    },
}

/// Errors from building a timestamped [`Signal`](crate::Signal).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignalError {
    /// Timestamps and values have different lengths.
    #[error("signal has {times} timestamps but {values} values")]
    LengthMismatch {
        /// Number of timestamps.
        times: usize,
        /// Number of values.
        values: usize,
    },

    /// A timestamp is NaN or infinite.
    #[error("timestamp at index {index} is not finite")]
    NonFiniteTime {
        /// Position of the offending timestamp.
        index: usize,
    },

    /// Timestamps are not strictly increasing.
    #[error("timestamps must be strictly increasing: t[{index}] = {value} follows {previous}")]
    NonIncreasingTime {
        /// Position of the offending timestamp.
        index: usize,
        /// The preceding timestamp.
        previous: f64,
        /// The offending timestamp.
        value: f64,
    },

    /// A uniform sampling interval is zero, negative or non-finite.
    #[error("sampling interval must be positive and finite, got {dt}")]
    InvalidInterval {
        /// The rejected interval.
        dt: f64,
    },

    /// The value sequence failed validation.
    #[error(transparent)]
    Series(#[from] DtwError),
}

/// Errors from piecewise-linear resampling.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResampleError {
    /// The query grid reaches outside the sampled time range. Extrapolation is
    /// never performed.
    #[error(
        "resample grid [{grid_min}, {grid_max}] lies outside the sampled domain [{domain_min}, {domain_max}]"
    )]
    OutOfDomain {
        /// Smallest query time.
        grid_min: f64,
        /// Largest query time.
        grid_max: f64,
        /// First sampled timestamp.
        domain_min: f64,
        /// Last sampled timestamp.
        domain_max: f64,
    },

    /// The query grid is empty, non-finite or not strictly increasing.
    #[error("invalid resample grid: {reason}")]
    InvalidGrid {
        /// What the grid violated.
        reason: &'static str,
    },
}
