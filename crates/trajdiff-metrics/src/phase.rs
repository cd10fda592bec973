//! Cross-correlation phase error.

use trajdiff_dtw::TimeSeriesView;

use crate::error::MetricError;

/// Full discrete cross-correlation of `a` against `b`.
///
/// Returns `n + m - 1` values with
/// `z[k] = Σ_l a[l] · b[l - k + m - 1]`, terms outside `b` omitted. Index
/// `m - 1` is zero lag.
#[must_use]
pub fn cross_correlate(a: &[f64], b: &[f64]) -> Vec<f64> {
    let (n, m) = (a.len(), b.len());
    if n == 0 || m == 0 {
        return Vec::new();
    }
    let mut z = vec![0.0; n + m - 1];
    for (k, out) in z.iter_mut().enumerate() {
        // l - k + m - 1 in [0, m) => l in [k + 1 - m, k], clipped to [0, n)
        let lo = (k + 1).saturating_sub(m);
        let hi = k.min(n - 1);
        *out = (lo..=hi).map(|l| a[l] * b[l + m - 1 - k]).sum();
    }
    z
}

/// Index of the first maximum. `None` for an empty slice.
fn first_argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (k, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((k, v)),
        }
    }
    best.map(|(k, _)| k)
}

/// Lag, in samples, at which `b` best matches `a`.
///
/// `argmax(cross_correlate(a, b)) - (len(a) - 1)`. Positive when `a` trails
/// `b`. Both sequences must have the same length so that `len(a) - 1` is
/// the zero-lag index.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`MetricError::Dtw`] | Either sequence is empty or non-finite |
/// | [`MetricError::LengthMismatch`] | `a.len() != b.len()` |
pub fn best_shift(a: &[f64], b: &[f64]) -> Result<i64, MetricError> {
    TimeSeriesView::new(a)?;
    TimeSeriesView::new(b)?;
    if a.len() != b.len() {
        return Err(MetricError::LengthMismatch {
            a: a.len(),
            b: b.len(),
        });
    }
    let z = cross_correlate(a, b);
    let peak = first_argmax(&z).unwrap_or(a.len() - 1);
    Ok(peak as i64 - (a.len() as i64 - 1))
}

/// `exp((shift - c) / r)`: 1.0 when the shift equals the acceptable offset
/// `c`.
///
/// # Errors
///
/// [`MetricError::ZeroSensitivity`] if `r == 0`.
pub fn shift_penalty(shift: i64, c: f64, r: f64) -> Result<f64, MetricError> {
    if r == 0.0 {
        return Err(MetricError::ZeroSensitivity);
    }
    Ok(((shift as f64 - c) / r).exp())
}

/// Phase error and the lag it was computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseEstimate {
    /// `exp((shift - c) / r)`.
    pub error: f64,
    /// Best cross-correlation lag in samples.
    pub shift: i64,
}

/// Phase error of `a` against `b` for a single `(c, r)`.
///
/// # Errors
///
/// Any error of [`best_shift`] or [`shift_penalty`].
pub fn phase_error(a: &[f64], b: &[f64], c: f64, r: f64) -> Result<PhaseEstimate, MetricError> {
    if r == 0.0 {
        return Err(MetricError::ZeroSensitivity);
    }
    let shift = best_shift(a, b)?;
    Ok(PhaseEstimate {
        error: shift_penalty(shift, c, r)?,
        shift,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_mode_hand_computed() {
        // a = [1, 2, 3], b = [0, 1, 0.5]
        // z[0] = a0*b2               = 0.5
        // z[1] = a0*b1 + a1*b2       = 1 + 1 = 2
        // z[2] = a0*b0 + a1*b1 + a2*b2 = 0 + 2 + 1.5 = 3.5
        // z[3] = a1*b0 + a2*b1       = 0 + 3 = 3
        // z[4] = a2*b0               = 0
        let z = cross_correlate(&[1.0, 2.0, 3.0], &[0.0, 1.0, 0.5]);
        assert_eq!(z, vec![0.5, 2.0, 3.5, 3.0, 0.0]);
    }

    #[test]
    fn unequal_lengths_have_full_length() {
        assert_eq!(cross_correlate(&[1.0; 4], &[1.0; 2]), vec![1.0, 2.0, 2.0, 2.0, 1.0]);
        assert!(cross_correlate(&[], &[1.0]).is_empty());
    }

    #[test]
    fn self_shift_is_zero() {
        let a = [0.0, 5.0, 10.0, 15.0];
        assert_eq!(best_shift(&a, &a).unwrap(), 0);
        let est = phase_error(&a, &a, 0.0, 3.0).unwrap();
        assert_eq!(est.shift, 0);
        assert_eq!(est.error, 1.0);
    }

    #[test]
    fn trailing_pulse_has_positive_shift() {
        let b = [0.0, 1.0, 0.0, 0.0, 0.0];
        let a = [0.0, 0.0, 0.0, 1.0, 0.0];
        assert_eq!(best_shift(&a, &b).unwrap(), 2);
        assert_eq!(best_shift(&b, &a).unwrap(), -2);
    }

    #[test]
    fn ties_take_first_maximum() {
        // All-zero correlation peaks at index 0.
        let zeros = [0.0; 3];
        assert_eq!(best_shift(&zeros, &zeros).unwrap(), -2);
    }

    #[test]
    fn penalty_matches_formula() {
        let err = shift_penalty(5, 20.0, 10.0).unwrap();
        assert!((err - (-1.5f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn zero_sensitivity_rejected() {
        assert!(matches!(
            phase_error(&[1.0], &[1.0], 0.0, 0.0),
            Err(MetricError::ZeroSensitivity)
        ));
    }

    #[test]
    fn length_mismatch_rejected() {
        assert!(matches!(
            best_shift(&[1.0, 2.0], &[1.0]),
            Err(MetricError::LengthMismatch { a: 2, b: 1 })
        ));
    }

    #[test]
    fn empty_rejected() {
        assert!(matches!(best_shift(&[], &[]), Err(MetricError::Dtw(_))));
    }
}
