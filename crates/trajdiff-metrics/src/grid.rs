//! Inclusive hyperparameter ranges for the phase search.

use trajdiff_dtw::linspace;

use crate::error::MetricError;

/// `steps` evenly spaced values from `start` to `end` inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    start: f64,
    end: f64,
    steps: usize,
}

impl ParamRange {
    /// Create a range.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MetricError::InvalidRange`] | `steps` is zero or an endpoint is not finite |
    pub fn new(start: f64, end: f64, steps: usize) -> Result<Self, MetricError> {
        if steps == 0 {
            return Err(MetricError::InvalidRange {
                reason: "range needs at least one step",
            });
        }
        if !start.is_finite() || !end.is_finite() {
            return Err(MetricError::InvalidRange {
                reason: "range endpoints must be finite",
            });
        }
        Ok(Self { start, end, steps })
    }

    /// Range holding the single value `value`.
    ///
    /// # Errors
    ///
    /// [`MetricError::InvalidRange`] if `value` is not finite.
    pub fn single(value: f64) -> Result<Self, MetricError> {
        Self::new(value, value, 1)
    }

    /// Return the first value.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Return the last value.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Return the number of values.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Expand into concrete values.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        linspace(self.start, self.end, self.steps)
    }

    /// Return true if any expanded value is exactly zero.
    #[must_use]
    pub fn contains_zero(&self) -> bool {
        self.values().iter().any(|&v| v == 0.0)
    }
}

impl Default for ParamRange {
    /// `linspace(1, 60, 100)`.
    fn default() -> Self {
        Self {
            start: 1.0,
            end: 60.0,
            steps: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid() {
        let values = ParamRange::default().values();
        assert_eq!(values.len(), 100);
        assert_eq!(values[0], 1.0);
        assert_eq!(values[99], 60.0);
        assert!((values[1] - (1.0 + 59.0 / 99.0)).abs() < 1e-12);
    }

    #[test]
    fn single_value() {
        let range = ParamRange::single(20.0).unwrap();
        assert_eq!(range.values(), vec![20.0]);
    }

    #[test]
    fn rejects_zero_steps_and_nan() {
        assert!(ParamRange::new(0.0, 1.0, 0).is_err());
        assert!(ParamRange::new(f64::NAN, 1.0, 3).is_err());
    }

    #[test]
    fn detects_zero() {
        assert!(ParamRange::new(-1.0, 1.0, 3).unwrap().contains_zero());
        assert!(!ParamRange::new(-1.0, 1.0, 4).unwrap().contains_zero());
    }
}
