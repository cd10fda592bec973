//! Resampling onto a common grid and per-`(quantity, pair)` comparison.

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::{info, instrument, warn};

use trajdiff_dtw::{Aligner, CostModel, PositionTerm, Signal};

use crate::domain::{Quantity, SourceId, SourcePair};
use crate::error::{ComparisonError, MetricError};
use crate::magnitude::{magnitude_error, topology_error};
use crate::report::{Discrepancy, ErrorReport, Failure, ReportRow};
use crate::search::{PhaseFit, PhaseSearchConfig};
use crate::trace::SourceTrace;

/// How the common comparison grid is built for each quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GridStrategy {
    /// Resample every source onto the reference source's timestamps.
    #[default]
    ReferenceTimes,
    /// Resample every source onto `linspace(own_t0, own_t1, len(reference))`,
    /// stretching it to the reference sample count over its own time span.
    SampleCount,
}

/// Configuration for a comparison run.
///
/// Construct via [`AnalysisConfig::default`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter       | Default |
/// |-----------------|---------|
/// | `cost`          | [`CostModel::DerivativeMismatch`] |
/// | `position_term` | [`PositionTerm::DpIndex`] |
/// | `grid_strategy` | [`GridStrategy::ReferenceTimes`] |
/// | `phase`         | `c, r ∈ linspace(1, 60, 100)` |
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnalysisConfig {
    cost: CostModel,
    position_term: PositionTerm,
    grid_strategy: GridStrategy,
    phase: PhaseSearchConfig,
}

/// All sources resampled onto the reference grid of one quantity.
#[derive(Debug, Clone)]
pub struct AlignedQuantity {
    /// The quantity.
    pub quantity: Quantity,
    /// Reference timestamps, or why the reference has no such signal.
    pub grid: Result<Vec<f64>, Failure>,
    /// One entry per source, in input order.
    pub signals: Vec<(SourceId, Result<Signal, Failure>)>,
}

impl AlignedQuantity {
    fn signal(&self, id: &SourceId) -> Result<&Signal, Failure> {
        self.signals
            .iter()
            .find(|(sid, _)| sid == id)
            .map(|(_, s)| s.as_ref().map_err(Clone::clone))
            .unwrap_or_else(|| {
                Err(Failure::from(ComparisonError::from(MetricError::UnknownSource {
                    name: id.to_string(),
                })))
            })
    }
}

/// Every source resampled for every quantity. Input to
/// [`AnalysisConfig::compare`] and to fused-dataset export.
#[derive(Debug, Clone)]
pub struct AlignedSet {
    reference: SourceId,
    sources: Vec<SourceId>,
    quantities: Vec<AlignedQuantity>,
}

impl AlignedSet {
    /// Return the reference source.
    #[must_use]
    pub fn reference(&self) -> &SourceId {
        &self.reference
    }

    /// Return the sources in input order.
    #[must_use]
    pub fn sources(&self) -> &[SourceId] {
        &self.sources
    }

    /// Return the per-quantity data in [`Quantity::ALL`] order.
    #[must_use]
    pub fn quantities(&self) -> &[AlignedQuantity] {
        &self.quantities
    }
}

impl AnalysisConfig {
    /// Set the local DTW cost.
    #[must_use]
    pub fn with_cost(mut self, cost: CostModel) -> Self {
        self.cost = cost;
        self
    }

    /// Set what the DTW cost sees as sample positions.
    #[must_use]
    pub fn with_position_term(mut self, position_term: PositionTerm) -> Self {
        self.position_term = position_term;
        self
    }

    /// Set how the comparison grid is built.
    #[must_use]
    pub fn with_grid_strategy(mut self, grid_strategy: GridStrategy) -> Self {
        self.grid_strategy = grid_strategy;
        self
    }

    /// Set the phase-error hyperparameter search.
    #[must_use]
    pub fn with_phase_search(mut self, phase: PhaseSearchConfig) -> Self {
        self.phase = phase;
        self
    }

    /// Return the local DTW cost.
    #[must_use]
    pub fn cost(&self) -> CostModel {
        self.cost
    }

    /// Return the position term.
    #[must_use]
    pub fn position_term(&self) -> PositionTerm {
        self.position_term
    }

    /// Return the grid strategy.
    #[must_use]
    pub fn grid_strategy(&self) -> GridStrategy {
        self.grid_strategy
    }

    /// Return the phase-error search configuration.
    #[must_use]
    pub fn phase_search(&self) -> &PhaseSearchConfig {
        &self.phase
    }

    /// Resample and compare `sources` against each other.
    ///
    /// # Errors
    ///
    /// As [`align_sources`](Self::align_sources). Failures of individual
    /// comparisons are recorded in the report instead.
    pub fn run(&self, reference: &str, sources: &[SourceTrace]) -> Result<ErrorReport, MetricError> {
        let aligned = self.align_sources(reference, sources)?;
        Ok(self.compare(&aligned))
    }

    /// Resample every source onto the grid of `reference` for each quantity.
    ///
    /// The reference signal itself is never resampled.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MetricError::TooFewSources`] | Fewer than two sources |
    /// | [`MetricError::DuplicateSource`] | Two sources share a name |
    /// | [`MetricError::UnknownSource`] | `reference` names no source |
    #[instrument(skip_all, fields(reference = %reference, n_sources = sources.len()))]
    pub fn align_sources(
        &self,
        reference: &str,
        sources: &[SourceTrace],
    ) -> Result<AlignedSet, MetricError> {
        if sources.len() < 2 {
            return Err(MetricError::TooFewSources {
                count: sources.len(),
            });
        }
        let mut seen = HashSet::new();
        for trace in sources {
            if !seen.insert(trace.id().as_str()) {
                return Err(MetricError::DuplicateSource {
                    name: trace.id().to_string(),
                });
            }
        }
        let reference_trace = sources
            .iter()
            .find(|t| t.id().as_str() == reference)
            .ok_or_else(|| MetricError::UnknownSource {
                name: reference.to_string(),
            })?;

        let quantities = Quantity::ALL
            .iter()
            .map(|&quantity| {
                let grid_signal = reference_trace.signal(quantity).map_err(Clone::clone);
                let signals = sources
                    .iter()
                    .map(|trace| {
                        let resampled = if trace.id() == reference_trace.id() {
                            grid_signal.clone().cloned()
                        } else {
                            self.resample_onto(trace, quantity, &grid_signal)
                        };
                        (trace.id().clone(), resampled)
                    })
                    .collect();
                AlignedQuantity {
                    quantity,
                    grid: grid_signal.map(|s| s.times().to_vec()),
                    signals,
                }
            })
            .collect();

        Ok(AlignedSet {
            reference: reference_trace.id().clone(),
            sources: sources.iter().map(|t| t.id().clone()).collect(),
            quantities,
        })
    }

    fn resample_onto(
        &self,
        trace: &SourceTrace,
        quantity: Quantity,
        reference: &Result<&Signal, Failure>,
    ) -> Result<Signal, Failure> {
        let reference = match reference {
            Ok(signal) => *signal,
            Err(failure) => return Err(failure.clone()),
        };
        let signal = trace.signal(quantity).map_err(Clone::clone)?;
        let resampled = match self.grid_strategy {
            GridStrategy::ReferenceTimes => signal.resample(reference.times()),
            GridStrategy::SampleCount => signal.resample_stretched(reference.len()),
        };
        resampled.map_err(|e| Failure::from(ComparisonError::from(e)))
    }

    /// Compute every `(quantity, pair)` comparison of `aligned`.
    ///
    /// Units run in parallel and are collected in quantity-major, pair-minor
    /// order. A failed unit is recorded and logged; the others proceed.
    #[instrument(skip_all, fields(n_sources = aligned.sources.len()))]
    pub fn compare(&self, aligned: &AlignedSet) -> ErrorReport {
        let pairs = SourcePair::all(&aligned.sources);
        let units: Vec<(&AlignedQuantity, &SourcePair)> = aligned
            .quantities
            .iter()
            .flat_map(|aq| pairs.iter().map(move |p| (aq, p)))
            .collect();
        info!(units = units.len(), "comparing sources");

        let rows: Vec<ReportRow> = units
            .par_iter()
            .map(|&(aq, pair)| self.compare_unit(aq, pair))
            .collect();

        for row in &rows {
            if let Err(failure) = &row.discrepancy {
                warn!(quantity = %row.quantity, pair = %row.pair, %failure, "discrepancy failed");
            }
            if let Err(failure) = &row.phase {
                warn!(quantity = %row.quantity, pair = %row.pair, %failure, "phase search failed");
            }
        }

        let report = ErrorReport::new(aligned.reference.clone(), aligned.sources.clone(), rows);
        info!(failures = report.failure_count(), "comparison complete");
        report
    }

    fn compare_unit(&self, aq: &AlignedQuantity, pair: &SourcePair) -> ReportRow {
        let inputs = aq
            .signal(&pair.first)
            .and_then(|a| aq.signal(&pair.second).map(|b| (a, b)));
        let (discrepancy, phase) = match inputs {
            Ok((a, b)) => (self.discrepancy(a, b), self.phase(a, b)),
            Err(failure) => (Err(failure.clone()), Err(failure)),
        };
        ReportRow {
            quantity: aq.quantity,
            pair: pair.clone(),
            discrepancy,
            phase,
        }
    }

    fn discrepancy(&self, a: &Signal, b: &Signal) -> Result<Discrepancy, Failure> {
        let alignment = Aligner::new(self.cost)
            .with_position_term(self.position_term)
            .align_signals(a, b);
        let metric = |r: Result<f64, MetricError>| r.map_err(|e| Failure::from(ComparisonError::from(e)));
        Ok(Discrepancy {
            dtw_distance: alignment.cost,
            magnitude_error: metric(magnitude_error(a.values(), b.values(), &alignment.path))?,
            topology_error: metric(topology_error(a.values(), b.values(), &alignment.path))?,
            path_len: alignment.path.len(),
        })
    }

    fn phase(&self, a: &Signal, b: &Signal) -> Result<PhaseFit, Failure> {
        self.phase
            .fit(a.values(), b.values())
            .map_err(|e| Failure::from(ComparisonError::from(e)))
    }
}
