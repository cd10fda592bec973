//! Timestamped signals and piecewise-linear resampling.

use tracing::{debug, instrument};

use crate::error::{ResampleError, SignalError};
use crate::series::TimeSeries;

/// One measured quantity from one source: strictly increasing timestamps
/// paired with finite values.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    times: Vec<f64>,
    values: TimeSeries,
}

impl Signal {
    /// Pair `times` with `values`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SignalError::Series`] | `values` is empty or contains a non-finite value |
    /// | [`SignalError::LengthMismatch`] | `times.len() != values.len()` |
    /// | [`SignalError::NonFiniteTime`] | A timestamp is NaN or infinite |
    /// | [`SignalError::NonIncreasingTime`] | Timestamps are not strictly increasing |
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Result<Self, SignalError> {
        let values = TimeSeries::new(values)?;
        if times.len() != values.len() {
            return Err(SignalError::LengthMismatch {
                times: times.len(),
                values: values.len(),
            });
        }
        if let Some(index) = times.iter().position(|t| !t.is_finite()) {
            return Err(SignalError::NonFiniteTime { index });
        }
        if let Some(index) = times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SignalError::NonIncreasingTime {
                index: index + 1,
                previous: times[index],
                value: times[index + 1],
            });
        }
        Ok(Self { times, values })
    }

    /// Build a signal sampled every `dt` seconds starting at `start`.
    ///
    /// Used for sources that log no per-sample timestamp. Sample `k` sits at
    /// `start + k * dt`.
    ///
    /// # Errors
    ///
    /// [`SignalError::InvalidInterval`] if `dt` is not positive and finite,
    /// otherwise as [`Signal::new`].
    pub fn uniform(start: f64, dt: f64, values: Vec<f64>) -> Result<Self, SignalError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SignalError::InvalidInterval { dt });
        }
        let times = (0..values.len()).map(|k| start + k as f64 * dt).collect();
        Self::new(times, values)
    }

    /// Build a signal from per-sample step durations, as logged by the
    /// co-simulation: `deltas[k]` is the length of tick `k`, so sample `k`
    /// sits at `start + deltas[0] + ... + deltas[k - 1]` and the first sample
    /// at `start`. The last duration only closes the final tick.
    ///
    /// # Errors
    ///
    /// As [`Signal::new`]; a zero or negative delta surfaces as
    /// [`SignalError::NonIncreasingTime`].
    pub fn from_deltas(start: f64, deltas: &[f64], values: Vec<f64>) -> Result<Self, SignalError> {
        let times = deltas
            .iter()
            .scan(start, |acc, &dt| {
                let t = *acc;
                *acc += dt;
                Some(t)
            })
            .collect();
        Self::new(times, values)
    }

    /// Timestamps, strictly increasing.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Sample values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        self.values.as_ref()
    }

    /// Sample values as a validated series.
    #[must_use]
    pub fn series(&self) -> &TimeSeries {
        &self.values
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always `false` for a constructed signal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// First and last timestamp.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        (self.times[0], self.times[self.times.len() - 1])
    }

    /// Evaluate this signal on `grid` by piecewise-linear interpolation.
    ///
    /// Grid points that coincide with a sampled timestamp return the sampled
    /// value exactly, so resampling onto the signal's own timestamps is the
    /// identity.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ResampleError::InvalidGrid`] | `grid` is empty, non-finite or not strictly increasing |
    /// | [`ResampleError::OutOfDomain`] | `min(grid) < min(t)` or `max(grid) > max(t)` |
    #[instrument(skip_all, fields(n_src = self.len(), n_grid = grid.len()))]
    pub fn resample(&self, grid: &[f64]) -> Result<Self, ResampleError> {
        check_grid(grid)?;
        let (domain_min, domain_max) = self.domain();
        let (grid_min, grid_max) = (grid[0], grid[grid.len() - 1]);
        if grid_min < domain_min || grid_max > domain_max {
            return Err(ResampleError::OutOfDomain {
                grid_min,
                grid_max,
                domain_min,
                domain_max,
            });
        }

        let values = self.values();
        let resampled: Vec<f64> = grid
            .iter()
            .map(|&t| {
                // Number of sampled timestamps <= t; at least 1 because t >= domain_min.
                let upper = self.times.partition_point(|&s| s <= t);
                let lo = upper - 1;
                if self.times[lo] == t || upper == self.times.len() {
                    return values[lo];
                }
                let (t0, t1) = (self.times[lo], self.times[upper]);
                let (v0, v1) = (values[lo], values[upper]);
                v0 + (v1 - v0) * (t - t0) / (t1 - t0)
            })
            .collect();
        debug!("resampled signal");

        Ok(Self {
            times: grid.to_vec(),
            values: TimeSeries::new(resampled).map_err(|_| ResampleError::InvalidGrid {
                reason: "interpolation produced a non-finite value",
            })?,
        })
    }

    /// Resample onto `n` evenly spaced points spanning this signal's own
    /// time range.
    ///
    /// # Errors
    ///
    /// [`ResampleError::InvalidGrid`] if `n == 0`, or if `n > 1` and the
    /// signal has a single sample (the grid would repeat a timestamp).
    pub fn resample_stretched(&self, n: usize) -> Result<Self, ResampleError> {
        let (start, end) = self.domain();
        self.resample(&linspace(start, end, n))
    }
}

/// `n` evenly spaced points from `start` to `end`, both inclusive.
///
/// `n == 1` yields `[start]`, `n == 0` yields an empty vector, and the last
/// point is exactly `end`.
#[must_use]
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut points: Vec<f64> = (0..n).map(|k| start + k as f64 * step).collect();
            points[n - 1] = end;
            points
        }
    }
}

fn check_grid(grid: &[f64]) -> Result<(), ResampleError> {
    if grid.is_empty() {
        return Err(ResampleError::InvalidGrid { reason: "grid is empty" });
    }
    if grid.iter().any(|t| !t.is_finite()) {
        return Err(ResampleError::InvalidGrid {
            reason: "grid contains a non-finite time",
        });
    }
    if grid.windows(2).any(|w| w[1] <= w[0]) {
        return Err(ResampleError::InvalidGrid {
            reason: "grid is not strictly increasing",
        });
    }
    Ok(())
}
