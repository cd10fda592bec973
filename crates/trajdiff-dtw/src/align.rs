//! Full-table DTW alignment with a pluggable local cost.

use tracing::{debug, instrument};

use crate::cost::{Cell, CostFn};
use crate::distance::DtwDistance;
use crate::error::DtwError;
use crate::gradient::gradient;
use crate::matrix::CostMatrix;
use crate::path::WarpPath;
use crate::series::TimeSeriesView;
use crate::signal::Signal;

/// What the cost function sees as the position of each sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PositionTerm {
    /// 1-based DP row/column index. Two signals on different or non-uniform
    /// grids are then compared by sample count, not elapsed time.
    #[default]
    DpIndex,
    /// The sample timestamps of the two signals.
    Timestamp,
}

/// Total cost and optimal warp path of one alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// Accumulated cost at `(n, m)`.
    pub cost: DtwDistance,
    /// Optimal path from `(0, 0)` to `(n-1, m-1)`.
    pub path: WarpPath,
}

/// DTW aligner. Immutable; cheap to copy when the cost function is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aligner<C> {
    cost: C,
    positions: PositionTerm,
}

impl<C: CostFn> Aligner<C> {
    /// Aligner with `cost` and [`PositionTerm::DpIndex`].
    #[must_use]
    pub fn new(cost: C) -> Self {
        Self {
            cost,
            positions: PositionTerm::DpIndex,
        }
    }

    /// Choose the position term used by [`align_signals`][Self::align_signals].
    #[must_use]
    pub fn with_position_term(mut self, positions: PositionTerm) -> Self {
        self.positions = positions;
        self
    }

    /// Return the configured position term.
    #[must_use]
    pub fn position_term(&self) -> PositionTerm {
        self.positions
    }

    /// Align two validated sequences, using DP indices as positions.
    ///
    /// O(n * m) time and space.
    #[must_use]
    #[instrument(skip_all, fields(n = a.len(), m = b.len()))]
    pub fn align(&self, a: TimeSeriesView<'_>, b: TimeSeriesView<'_>) -> Alignment {
        let table = self.cost_matrix(a, b);
        finish(&table)
    }

    /// Align two raw slices.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySeries`] | Either slice is empty |
    /// | [`DtwError::NonFiniteValue`] | Either slice contains NaN or an infinity |
    pub fn align_slices(&self, a: &[f64], b: &[f64]) -> Result<Alignment, DtwError> {
        Ok(self.align(TimeSeriesView::new(a)?, TimeSeriesView::new(b)?))
    }

    /// Align the values of two signals. Positions follow the configured
    /// [`PositionTerm`].
    #[must_use]
    #[instrument(skip_all, fields(n = a.len(), m = b.len(), positions = ?self.positions))]
    pub fn align_signals(&self, a: &Signal, b: &Signal) -> Alignment {
        let table = match self.positions {
            PositionTerm::DpIndex => self.fill(a.values(), b.values(), |i| i as f64, |j| j as f64),
            PositionTerm::Timestamp => {
                let (ta, tb) = (a.times(), b.times());
                self.fill(a.values(), b.values(), |i| ta[i - 1], |j| tb[j - 1])
            }
        };
        finish(&table)
    }

    /// Fill and return the full DP table for two sequences, with DP indices
    /// as positions.
    #[must_use]
    pub fn cost_matrix(&self, a: TimeSeriesView<'_>, b: TimeSeriesView<'_>) -> CostMatrix {
        self.fill(a.as_slice(), b.as_slice(), |i| i as f64, |j| j as f64)
    }

    /// `table[i][j] = cost(a[i-1], b[j-1], pos_a(i), pos_b(j), da[i-1], db[j-1])
    ///                + min(table[i-1][j], table[i][j-1], table[i-1][j-1])`
    fn fill(
        &self,
        a: &[f64],
        b: &[f64],
        pos_a: impl Fn(usize) -> f64,
        pos_b: impl Fn(usize) -> f64,
    ) -> CostMatrix {
        let (n, m) = (a.len(), b.len());
        let da = gradient(a);
        let db = gradient(b);
        let mut table = CostMatrix::new(n, m);

        for i in 1..=n {
            let ti = pos_a(i);
            for j in 1..=m {
                let cell = Cell {
                    a: a[i - 1],
                    b: b[j - 1],
                    ti,
                    tj: pos_b(j),
                    da: da[i - 1],
                    db: db[j - 1],
                };
                let value = self.cost.cost(&cell) + table.min_predecessor(i, j);
                table.set(i, j, value);
            }
        }
        table
    }
}

fn finish(table: &CostMatrix) -> Alignment {
    let path = table.backtrack();
    let cost = DtwDistance::new(table.total_cost());
    debug!(cost = cost.value(), path_len = path.len(), "alignment complete");
    Alignment { cost, path }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{DerivativeMismatch, SquaredDifference};
    use crate::path::WarpStep;
    use crate::series::TimeSeries;

    fn ts(values: &[f64]) -> TimeSeries {
        TimeSeries::new(values.to_vec()).unwrap()
    }

    #[test]
    fn identical_sequences_align_on_diagonal_at_zero_cost() {
        let a = ts(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]);
        let alignment = Aligner::new(DerivativeMismatch).align(a.as_view(), a.as_view());
        assert_eq!(alignment.cost.value(), 0.0);
        assert_eq!(alignment.path.len(), a.len());
        for (k, step) in alignment.path.steps().iter().enumerate() {
            assert_eq!(*step, WarpStep { a: k, b: k });
        }
    }

    #[test]
    fn squared_difference_hand_computed_2x2() {
        // a=[0,1], b=[1,0]
        // T[1][1] = 1, T[1][2] = 0 + 1 = 1, T[2][1] = 0 + 1 = 1,
        // T[2][2] = 1 + min(1, 1, 1) = 2
        let a = ts(&[0.0, 1.0]);
        let b = ts(&[1.0, 0.0]);
        let alignment = Aligner::new(SquaredDifference).align(a.as_view(), b.as_view());
        assert_eq!(alignment.cost.value(), 2.0);
        let pairs: Vec<(usize, usize)> =
            alignment.path.steps().iter().map(|s| (s.a, s.b)).collect();
        assert_eq!(pairs, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn derivative_mismatch_hand_computed() {
        // a=[0,2] (gradient [2,2]), b=[0,0,0] (gradient [0,0,0])
        // cost(i,j) = ((a-b)^2 + (i-j)^2) * 2
        // T[1][1] = (0 + 0) * 2 = 0
        // T[1][2] = (0 + 1) * 2 + 0 = 2
        // T[1][3] = (0 + 4) * 2 + 2 = 10
        // T[2][1] = (4 + 1) * 2 + 0 = 10
        // T[2][2] = (4 + 0) * 2 + min(2, 10, 0) = 8
        // T[2][3] = (4 + 1) * 2 + min(10, 8, 2) = 12
        let a = ts(&[0.0, 2.0]);
        let b = ts(&[0.0, 0.0, 0.0]);
        let aligner = Aligner::new(DerivativeMismatch);
        let table = aligner.cost_matrix(a.as_view(), b.as_view());
        assert_eq!(table.get(1, 1), 0.0);
        assert_eq!(table.get(1, 2), 2.0);
        assert_eq!(table.get(1, 3), 10.0);
        assert_eq!(table.get(2, 1), 10.0);
        assert_eq!(table.get(2, 2), 8.0);
        assert_eq!(table.get(2, 3), 12.0);

        let alignment = aligner.align(a.as_view(), b.as_view());
        assert_eq!(alignment.cost.value(), 12.0);
        // From (2,3): diag T[1][2]=2, above T[1][3]=10, left T[2][2]=8 -> diag.
        let pairs: Vec<(usize, usize)> =
            alignment.path.steps().iter().map(|s| (s.a, s.b)).collect();
        assert_eq!(pairs, vec![(0, 0), (0, 1), (1, 2)]);
    }

    #[test]
    fn path_endpoints_and_length_bounds() {
        let a = ts(&[1.0, 5.0, 2.0, 8.0, 3.0]);
        let b = ts(&[2.0, 4.0, 7.0]);
        let alignment = Aligner::new(DerivativeMismatch).align(a.as_view(), b.as_view());
        let steps = alignment.path.steps();
        assert_eq!(steps[0], WarpStep { a: 0, b: 0 });
        assert_eq!(alignment.path.end(), Some(WarpStep { a: 4, b: 2 }));
        assert!(steps.len() >= 5 && steps.len() <= 7);
    }

    #[test]
    fn single_sample_sequences() {
        let a = ts(&[5.0]);
        let b = ts(&[3.0]);
        let alignment = Aligner::new(SquaredDifference).align(a.as_view(), b.as_view());
        assert_eq!(alignment.cost.value(), 4.0);
        assert_eq!(alignment.path.steps(), &[WarpStep { a: 0, b: 0 }]);
    }

    #[test]
    fn empty_slice_is_invalid_input() {
        let result = Aligner::new(DerivativeMismatch).align_slices(&[], &[1.0]);
        assert!(matches!(result, Err(DtwError::EmptySeries)));
    }

    #[test]
    fn timestamp_positions_change_the_penalty() {
        // Same values, different time grids: only the position term differs.
        let a = Signal::new(vec![0.0, 10.0, 20.0], vec![0.0, 1.0, 3.0]).unwrap();
        let b = Signal::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 3.0]).unwrap();
        let by_index = Aligner::new(SquaredDifference)
            .with_position_term(PositionTerm::DpIndex)
            .align_signals(&a, &b);
        assert_eq!(by_index.cost.value(), 0.0);

        let positional = |c: &Cell| (c.ti - c.tj).powi(2);
        let by_index = Aligner::new(positional).align_signals(&a, &b);
        let by_time = Aligner::new(positional)
            .with_position_term(PositionTerm::Timestamp)
            .align_signals(&a, &b);
        assert_eq!(by_index.cost.value(), 0.0);
        assert!(by_time.cost.value() > 0.0);
    }
}
