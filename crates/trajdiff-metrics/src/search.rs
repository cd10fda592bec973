//! Grid search over the phase-error hyperparameters `(c, r)`.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::error::MetricError;
use crate::grid::ParamRange;
use crate::phase::{best_shift, shift_penalty};

/// Configuration for the `(c, r)` phase-error grid search.
///
/// Construct via [`PhaseSearchConfig::new`] or [`Default`].
///
/// # Defaults
///
/// | Parameter | Default |
/// |-----------|---------|
/// | `c_range` | `linspace(1, 60, 100)` |
/// | `r_range` | `linspace(1, 60, 100)` |
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhaseSearchConfig {
    c_range: ParamRange,
    r_range: ParamRange,
}

/// Best `(c, r)` for one pair of sequences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseFit {
    /// Acceptable offset minimizing the error.
    pub c: f64,
    /// Sensitivity minimizing the error.
    pub r: f64,
    /// Best cross-correlation lag, `n*`.
    pub shift: i64,
    /// `exp((shift - c) / r)` at the chosen `(c, r)`.
    pub error: f64,
}

impl PhaseSearchConfig {
    /// Create a search over `c_range × r_range`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MetricError::ZeroSensitivity`] | `r_range` contains `0` |
    pub fn new(c_range: ParamRange, r_range: ParamRange) -> Result<Self, MetricError> {
        if r_range.contains_zero() {
            return Err(MetricError::ZeroSensitivity);
        }
        Ok(Self { c_range, r_range })
    }

    /// Return the acceptable-offset range.
    #[must_use]
    pub fn c_range(&self) -> ParamRange {
        self.c_range
    }

    /// Return the sensitivity range.
    #[must_use]
    pub fn r_range(&self) -> ParamRange {
        self.r_range
    }

    /// Find the `(c, r)` minimizing the phase error of `a` against `b`.
    ///
    /// The cross-correlation is computed once. Grid cells are scored in
    /// parallel; ties resolve to the first cell in `c`-major, `r`-minor
    /// order, so the result does not depend on thread scheduling.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MetricError::Dtw`] | Either sequence is empty or non-finite |
    /// | [`MetricError::LengthMismatch`] | `a.len() != b.len()` |
    #[instrument(skip_all, fields(n = a.len(), cells = self.c_range.steps() * self.r_range.steps()))]
    pub fn fit(&self, a: &[f64], b: &[f64]) -> Result<PhaseFit, MetricError> {
        let shift = best_shift(a, b)?;
        let cs = self.c_range.values();
        let rs = self.r_range.values();
        let width = rs.len();

        let scored: Result<Vec<(usize, f64)>, MetricError> = (0..cs.len() * width)
            .into_par_iter()
            .map(|idx| Ok((idx, shift_penalty(shift, cs[idx / width], rs[idx % width])?)))
            .collect();
        let (idx, error) = scored?
            .into_iter()
            .min_by(|x, y| x.1.total_cmp(&y.1).then(x.0.cmp(&y.0)))
            .ok_or(MetricError::InvalidRange {
                reason: "empty search grid",
            })?;

        let fit = PhaseFit {
            c: cs[idx / width],
            r: rs[idx % width],
            shift,
            error,
        };
        debug!(c = fit.c, r = fit.r, shift, error, "phase search complete");
        Ok(fit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_prefers_largest_offset_and_smallest_sensitivity() {
        // shift 0: exp(-c / r) is smallest at c = 60, r = 1.
        let a = [0.0, 5.0, 10.0, 15.0];
        let fit = PhaseSearchConfig::default().fit(&a, &a).unwrap();
        assert_eq!(fit.shift, 0);
        assert_eq!(fit.c, 60.0);
        assert_eq!(fit.r, 1.0);
        assert!((fit.error - (-60.0f64).exp()).abs() < 1e-30);
    }

    #[test]
    fn fixed_point_reproduces_single_evaluation() {
        let config = PhaseSearchConfig::new(
            ParamRange::single(20.0).unwrap(),
            ParamRange::single(10.0).unwrap(),
        )
        .unwrap();
        let a = [0.0, 0.0, 1.0, 0.0, 0.0];
        let b = [0.0, 1.0, 0.0, 0.0, 0.0];
        let fit = config.fit(&a, &b).unwrap();
        assert_eq!(fit.shift, 1);
        assert_eq!((fit.c, fit.r), (20.0, 10.0));
        assert!((fit.error - (-1.9f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn ties_resolve_to_first_cell() {
        // With shift 0 and c = 0 every r scores exp(0) = 1.
        let config = PhaseSearchConfig::new(
            ParamRange::single(0.0).unwrap(),
            ParamRange::new(1.0, 5.0, 5).unwrap(),
        )
        .unwrap();
        let a = [1.0, 2.0, 1.0];
        let fit = config.fit(&a, &a).unwrap();
        assert_eq!(fit.error, 1.0);
        assert_eq!(fit.r, 1.0);
    }

    #[test]
    fn rejects_zero_sensitivity_range() {
        let result = PhaseSearchConfig::new(
            ParamRange::default(),
            ParamRange::new(0.0, 10.0, 11).unwrap(),
        );
        assert!(matches!(result, Err(MetricError::ZeroSensitivity)));
    }
}
