//! Discrepancy metrics between aligned trajectory signals.
//!
//! Magnitude and topology error along a DTW warp path, cross-correlation
//! phase error with a `(c, r)` hyperparameter search, and an engine that
//! resamples several sources onto a common grid and scores every
//! `(quantity, source pair)` with per-unit failure isolation.
//!
//! Pure computation, zero I/O.

mod domain;
mod engine;
mod error;
mod grid;
mod magnitude;
mod phase;
mod report;
mod search;
mod trace;

pub use domain::{Quantity, SourceId, SourcePair};
pub use engine::{AlignedQuantity, AlignedSet, AnalysisConfig, GridStrategy};
pub use error::{ComparisonError, MetricError};
pub use grid::ParamRange;
pub use magnitude::{ZERO_REFERENCE_EPS, magnitude_error, topology_error};
pub use phase::{PhaseEstimate, best_shift, cross_correlate, phase_error, shift_penalty};
pub use report::{Discrepancy, ErrorReport, Failure, FailureKind, ReportRow};
pub use search::{PhaseFit, PhaseSearchConfig};
pub use trace::SourceTrace;
