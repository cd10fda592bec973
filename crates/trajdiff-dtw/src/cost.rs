//! Local cost functions evaluated at each cell of the DTW table.

/// Inputs to the local cost of pairing `a` (from the first sequence) with
/// `b` (from the second).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Value from the first sequence.
    pub a: f64,
    /// Value from the second sequence.
    pub b: f64,
    /// Position of `a`: the 1-based DP row index, or its timestamp.
    pub ti: f64,
    /// Position of `b`: the 1-based DP column index, or its timestamp.
    pub tj: f64,
    /// Numerical derivative of the first sequence at `a`.
    pub da: f64,
    /// Numerical derivative of the second sequence at `b`.
    pub db: f64,
}

/// A local cost for pairing two samples.
///
/// Implemented for any `Fn(&Cell) -> f64`, so ad-hoc costs can be passed as
/// closures.
pub trait CostFn {
    /// Cost of pairing the samples described by `cell`. Should be
    /// non-negative.
    fn cost(&self, cell: &Cell) -> f64;
}

impl<F> CostFn for F
where
    F: Fn(&Cell) -> f64,
{
    fn cost(&self, cell: &Cell) -> f64 {
        self(cell)
    }
}

/// `((a - b)^2 + (ti - tj)^2) * |da - db|`
///
/// Combined magnitude, position and derivative-mismatch penalty. Zero
/// whenever the two derivatives agree, so pairing samples on parallel
/// stretches of both signals is free.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivativeMismatch;

impl CostFn for DerivativeMismatch {
    fn cost(&self, c: &Cell) -> f64 {
        ((c.a - c.b).powi(2) + (c.ti - c.tj).powi(2)) * (c.da - c.db).abs()
    }
}

/// Classic `(a - b)^2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquaredDifference;

impl CostFn for SquaredDifference {
    fn cost(&self, c: &Cell) -> f64 {
        (c.a - c.b).powi(2)
    }
}

/// Named choice of built-in cost, selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CostModel {
    /// [`DerivativeMismatch`].
    #[default]
    DerivativeMismatch,
    /// [`SquaredDifference`].
    SquaredDifference,
}

impl CostFn for CostModel {
    fn cost(&self, cell: &Cell) -> f64 {
        match self {
            Self::DerivativeMismatch => DerivativeMismatch.cost(cell),
            Self::SquaredDifference => SquaredDifference.cost(cell),
        }
    }
}
