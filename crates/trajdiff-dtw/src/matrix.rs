//! Dynamic-programming table for DTW.

use crate::path::{WarpPath, WarpStep};

/// `(n+1) x (m+1)` accumulated-cost table, stored row-major.
///
/// Row 0 and column 0 are the border: cell `(0, 0)` is zero and every other
/// border cell is `+inf`. Cell `(i, j)` for `i, j >= 1` holds the cheapest
/// accumulated cost of aligning the first `i` samples of one sequence with the
/// first `j` samples of the other.
#[derive(Debug, Clone)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    /// Fresh table for sequences of length `n` and `m`, border initialized.
    pub(crate) fn new(n: usize, m: usize) -> Self {
        let rows = n + 1;
        let cols = m + 1;
        let mut data = vec![f64::INFINITY; rows * cols];
        data[0] = 0.0;
        Self { rows, cols, data }
    }

    /// `(n + 1, m + 1)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Accumulated cost at `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `(i, j)` lies outside the table.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(
            i < self.rows && j < self.cols,
            "cell ({i}, {j}) out of bounds for table of shape ({}, {})",
            self.rows,
            self.cols
        );
        self.data[i * self.cols + j]
    }

    pub(crate) fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.cols + j] = value;
    }

    /// Cheapest of the three predecessors of `(i, j)`: diagonal, above, left.
    pub(crate) fn min_predecessor(&self, i: usize, j: usize) -> f64 {
        let above = self.data[(i - 1) * self.cols + j];
        let left = self.data[i * self.cols + j - 1];
        let diag = self.data[(i - 1) * self.cols + j - 1];
        above.min(left).min(diag)
    }

    /// Total alignment cost, the bottom-right cell.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.data[self.data.len() - 1]
    }

    /// Trace the optimal warp path back from `(n, m)`.
    ///
    /// Each visited DP cell `(i, j)` contributes sequence pairing
    /// `(i-1, j-1)`. At every cell the walk moves to whichever of diagonal,
    /// above, left holds the smallest value, preferring diagonal and then
    /// above on ties. Once the walk reaches the first row or column it slides
    /// along it to `(1, 1)`, so the path always starts at `(0, 0)` exactly
    /// once.
    #[must_use]
    pub fn backtrack(&self) -> WarpPath {
        let mut i = self.rows - 1;
        let mut j = self.cols - 1;
        let mut steps = Vec::with_capacity(i + j);

        loop {
            steps.push(WarpStep { a: i - 1, b: j - 1 });
            match (i, j) {
                (1, 1) => break,
                (1, _) => j -= 1,
                (_, 1) => i -= 1,
                _ => {
                    let diag = self.get(i - 1, j - 1);
                    let above = self.get(i - 1, j);
                    let left = self.get(i, j - 1);
                    if diag <= above && diag <= left {
                        i -= 1;
                        j -= 1;
                    } else if above <= left {
                        i -= 1;
                    } else {
                        j -= 1;
                    }
                }
            }
        }

        steps.reverse();
        WarpPath::new(steps)
    }
}
