//! Warp-path-aligned magnitude and topology error.

use trajdiff_dtw::{WarpPath, gradient};

use crate::error::MetricError;

/// Denominators below this are treated as zero.
pub const ZERO_REFERENCE_EPS: f64 = 1e-12;

/// `Σ|A[i] - B[j]| / Σ|B[j]|` over the steps `(i, j)` of `path`.
///
/// `b` is the normalizing reference.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`MetricError::PathOutOfBounds`] | A step indexes past the end of `a` or `b` |
/// | [`MetricError::ZeroReference`] | `Σ|B[j]|` is below [`ZERO_REFERENCE_EPS`] |
pub fn magnitude_error(a: &[f64], b: &[f64], path: &WarpPath) -> Result<f64, MetricError> {
    // Steps never decrease, so the last one carries the largest indices.
    if let Some(end) = path.end() {
        if end.a >= a.len() || end.b >= b.len() {
            return Err(MetricError::PathOutOfBounds {
                a: end.a,
                b: end.b,
                len_a: a.len(),
                len_b: b.len(),
            });
        }
    }
    let (xs, ys) = path.gather(a, b);
    let mismatch: f64 = xs.iter().zip(&ys).map(|(x, y)| (x - y).abs()).sum();
    let reference: f64 = ys.iter().map(|y| y.abs()).sum();
    if reference < ZERO_REFERENCE_EPS {
        return Err(MetricError::ZeroReference {
            denominator: reference,
        });
    }
    Ok(mismatch / reference)
}

/// [`magnitude_error`] applied to the numerical gradients of `a` and `b`,
/// paired along the same path. Measures shape rather than amplitude.
///
/// # Errors
///
/// As [`magnitude_error`]. A constant reference has a zero gradient and
/// therefore always fails with [`MetricError::ZeroReference`].
pub fn topology_error(a: &[f64], b: &[f64], path: &WarpPath) -> Result<f64, MetricError> {
    magnitude_error(&gradient(a), &gradient(b), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagonal(n: usize) -> WarpPath {
        let pairs: Vec<(usize, usize)> = (0..n).map(|k| (k, k)).collect();
        WarpPath::from_pairs(&pairs).unwrap()
    }

    #[test]
    fn self_comparison_is_exactly_zero() {
        let a = [0.0, 5.0, 10.0, 15.0];
        let path = diagonal(4);
        assert_eq!(magnitude_error(&a, &a, &path).unwrap(), 0.0);
        assert_eq!(topology_error(&a, &a, &path).unwrap(), 0.0);
    }

    #[test]
    fn hand_computed_magnitude() {
        // path (0,0) (1,0) (2,1): |1-2| + |3-2| + |5-4| = 3, |2| + |2| + |4| = 8
        let path = WarpPath::from_pairs(&[(0, 0), (1, 0), (2, 1)]).unwrap();
        let err = magnitude_error(&[1.0, 3.0, 5.0], &[2.0, 4.0], &path).unwrap();
        assert!((err - 3.0 / 8.0).abs() < 1e-12);
    }

    #[test]
    fn hand_computed_topology() {
        // gradient([0, 2, 4]) = [2, 2, 2]; gradient([0, 1, 2]) = [1, 1, 1]
        let path = diagonal(3);
        let err = topology_error(&[0.0, 2.0, 4.0], &[0.0, 1.0, 2.0], &path).unwrap();
        assert!((err - 1.0).abs() < 1e-12);
    }

    #[test]
    fn all_zero_reference_is_division_by_zero() {
        let path = diagonal(3);
        let result = magnitude_error(&[1.0, 2.0, 3.0], &[0.0, 0.0, 0.0], &path);
        assert!(matches!(result, Err(MetricError::ZeroReference { .. })));
    }

    #[test]
    fn constant_reference_has_no_topology() {
        let path = diagonal(3);
        let result = topology_error(&[1.0, 2.0, 3.0], &[7.0, 7.0, 7.0], &path);
        assert!(matches!(result, Err(MetricError::ZeroReference { .. })));
    }

    #[test]
    fn path_past_sequence_end() {
        let path = diagonal(4);
        let result = magnitude_error(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0, 4.0], &path);
        assert!(matches!(
            result,
            Err(MetricError::PathOutOfBounds { a: 3, len_a: 3, .. })
        ));
    }

    #[test]
    fn reference_side_past_end() {
        let path = WarpPath::from_pairs(&[(0, 0), (1, 1), (1, 2)]).unwrap();
        let result = magnitude_error(&[1.0, 2.0], &[1.0, 2.0], &path);
        assert!(matches!(
            result,
            Err(MetricError::PathOutOfBounds { b: 2, len_b: 2, .. })
        ));
    }
}
