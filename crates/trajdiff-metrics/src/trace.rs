//! Per-source bundle of loaded signals.

use trajdiff_dtw::Signal;

use crate::domain::{Quantity, SourceId};
use crate::error::ComparisonError;
use crate::report::{Failure, FailureKind};

/// The signals of one source, one slot per [`Quantity`].
///
/// A slot holds either the loaded signal or the reason it could not be
/// loaded, so that one missing column only fails the comparisons that need
/// it.
#[derive(Debug, Clone)]
pub struct SourceTrace {
    id: SourceId,
    signals: [Result<Signal, Failure>; 4],
}

impl SourceTrace {
    /// Trace with every slot marked as not loaded.
    #[must_use]
    pub fn new(id: SourceId) -> Self {
        let missing = |q: Quantity| {
            Err(Failure {
                kind: FailureKind::DataFormat,
                message: format!("no {q} signal loaded for source {id}"),
            })
        };
        let signals = Quantity::ALL.map(missing);
        Self { id, signals }
    }

    /// Store `signal` for `quantity`.
    #[must_use]
    pub fn with_signal(self, quantity: Quantity, signal: Signal) -> Self {
        self.with_result(quantity, Ok(signal))
    }

    /// Store a loading outcome for `quantity`.
    #[must_use]
    pub fn with_result(
        mut self,
        quantity: Quantity,
        result: Result<Signal, ComparisonError>,
    ) -> Self {
        self.signals[quantity.index()] = result.map_err(Failure::from);
        self
    }

    /// Return the source name.
    #[must_use]
    pub fn id(&self) -> &SourceId {
        &self.id
    }

    /// Return the signal for `quantity`, or why it is unavailable.
    pub fn signal(&self, quantity: Quantity) -> Result<&Signal, &Failure> {
        self.signals[quantity.index()].as_ref()
    }
}
