//! Immutable comparison report and its console rendering.

use std::fmt;

use trajdiff_dtw::DtwDistance;

use crate::domain::{Quantity, SourceId, SourcePair};
use crate::error::ComparisonError;
use crate::search::PhaseFit;

/// Category of a failed comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A required column was missing, empty or malformed.
    DataFormat,
    /// A resample grid fell outside a source's sampled time range.
    Domain,
    /// Empty or length-mismatched sequences, or bad parameters.
    InvalidInput,
    /// Degenerate all-zero reference in magnitude or topology error.
    DivisionByZero,
}

impl FailureKind {
    /// Stable name used in reports.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::DataFormat => "DataFormatError",
            Self::Domain => "DomainError",
            Self::InvalidInput => "InvalidInputError",
            Self::DivisionByZero => "DivisionByZeroError",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// A recorded failure of one unit of work. Cheap to clone so the same
/// loading failure can be reported by every pair that needed the signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Category.
    pub kind: FailureKind,
    /// Human-readable cause.
    pub message: String,
}

impl From<ComparisonError> for Failure {
    fn from(err: ComparisonError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Warp-path metrics for one `(quantity, pair)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discrepancy {
    /// Accumulated DTW cost.
    pub dtw_distance: DtwDistance,
    /// `Σ|A - B| / Σ|B|` along the warp path.
    pub magnitude_error: f64,
    /// Magnitude error of the numerical gradients.
    pub topology_error: f64,
    /// Number of steps in the warp path.
    pub path_len: usize,
}

/// One `(quantity, pair)` row of an [`ErrorReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    /// Compared quantity.
    pub quantity: Quantity,
    /// Compared sources.
    pub pair: SourcePair,
    /// DTW distance with magnitude and topology error.
    pub discrepancy: Result<Discrepancy, Failure>,
    /// Best phase-error fit.
    pub phase: Result<PhaseFit, Failure>,
}

/// Every comparison of one analysis run, in quantity-major, pair-minor
/// order. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    reference: SourceId,
    sources: Vec<SourceId>,
    rows: Vec<ReportRow>,
}

impl ErrorReport {
    pub(crate) fn new(reference: SourceId, sources: Vec<SourceId>, rows: Vec<ReportRow>) -> Self {
        Self {
            reference,
            sources,
            rows,
        }
    }

    /// Return the source whose grid the others were resampled onto.
    #[must_use]
    pub fn reference(&self) -> &SourceId {
        &self.reference
    }

    /// Return the compared sources in input order.
    #[must_use]
    pub fn sources(&self) -> &[SourceId] {
        &self.sources
    }

    /// Return all rows.
    #[must_use]
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Return the row for `quantity` and the pair `first-second`, if present.
    #[must_use]
    pub fn row(&self, quantity: Quantity, first: &str, second: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|r| {
            r.quantity == quantity
                && r.pair.first.as_str() == first
                && r.pair.second.as_str() == second
        })
    }

    /// Number of failed metric computations (discrepancy and phase counted
    /// separately).
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| usize::from(r.discrepancy.is_err()) + usize::from(r.phase.is_err()))
            .sum()
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<9} {:<24} {:>16} {:>16} {:>16}",
            "quantity", "pair", "dtw_distance", "magnitude_error", "topology_error"
        )?;
        for row in &self.rows {
            let label = format!("{:<9} {:<24}", row.quantity, row.pair.to_string());
            match &row.discrepancy {
                Ok(d) => writeln!(
                    f,
                    "{label} {:>16} {:>16.6} {:>16.6}",
                    d.dtw_distance.to_string(),
                    d.magnitude_error,
                    d.topology_error
                )?,
                Err(failure) => writeln!(f, "{label} {failure}")?,
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "{:<9} {:<24} {:>10} {:>10} {:>6} {:>14}",
            "quantity", "pair", "c", "r", "n*", "phase_error"
        )?;
        for row in &self.rows {
            let label = format!("{:<9} {:<24}", row.quantity, row.pair.to_string());
            match &row.phase {
                Ok(p) => writeln!(
                    f,
                    "{label} {:>10.4} {:>10.4} {:>6} {:>14.6e}",
                    p.c, p.r, p.shift, p.error
                )?,
                Err(failure) => writeln!(f, "{label} {failure}")?,
            }
        }
        Ok(())
    }
}
