//! Warp path types for DTW alignment.

use crate::error::DtwError;

/// One pairing of index `a` in the first sequence with index `b` in the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarpStep {
    /// Index in the first sequence.
    pub a: usize,
    /// Index in the second sequence.
    pub b: usize,
}

/// Ordered pairings from `(0, 0)` to `(n-1, m-1)`, monotone non-decreasing in
/// both indices, each step advancing one or both indices by exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarpPath(Vec<WarpStep>);

impl WarpPath {
    pub(crate) fn new(steps: Vec<WarpStep>) -> Self {
        Self(steps)
    }

    /// Build a path from raw `(a, b)` pairs, checking that it starts at
    /// `(0, 0)` and only takes unit steps right, down or diagonally.
    ///
    /// # Errors
    ///
    /// [`DtwError::InvalidPath`] if the pairs are empty, do not start at
    /// `(0, 0)`, or contain a step other than `(+1, 0)`, `(0, +1)`, `(+1, +1)`.
    pub fn from_pairs(pairs: &[(usize, usize)]) -> Result<Self, DtwError> {
        let invalid = |reason: String| DtwError::InvalidPath { reason };
        match pairs.first() {
            None => return Err(invalid("path is empty".into())),
            Some(&(a, b)) if (a, b) != (0, 0) => {
                return Err(invalid(format!("path starts at ({a}, {b}), not (0, 0)")));
            }
            Some(_) => {}
        }
        for (k, w) in pairs.windows(2).enumerate() {
            let da = w[1].0.checked_sub(w[0].0);
            let db = w[1].1.checked_sub(w[0].1);
            let ok = matches!((da, db), (Some(0), Some(1)) | (Some(1), Some(0)) | (Some(1), Some(1)));
            if !ok {
                return Err(invalid(format!(
                    "step {} goes from {:?} to {:?}",
                    k + 1,
                    w[0],
                    w[1]
                )));
            }
        }
        Ok(Self(
            pairs.iter().map(|&(a, b)| WarpStep { a, b }).collect(),
        ))
    }

    /// The warp steps in order.
    #[must_use]
    pub fn steps(&self) -> &[WarpStep] {
        &self.0
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path contains no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The final step, `(n-1, m-1)` for an aligner-produced path.
    #[must_use]
    pub fn end(&self) -> Option<WarpStep> {
        self.0.last().copied()
    }

    /// Gather `a[step.a]` and `b[step.b]` along the path.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of range for `a` or `b`.
    #[must_use]
    pub fn gather(&self, a: &[f64], b: &[f64]) -> (Vec<f64>, Vec<f64>) {
        self.0.iter().map(|s| (a[s.a], b[s.b])).unzip()
    }
}

impl<'a> IntoIterator for &'a WarpPath {
    type Item = &'a WarpStep;
    type IntoIter = std::slice::Iter<'a, WarpStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
