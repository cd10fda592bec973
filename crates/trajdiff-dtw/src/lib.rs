//! Signal alignment primitives for trajectory comparison.
//!
//! Pure math library, zero I/O. Provides validated series and timestamped
//! signals, piecewise-linear resampling onto a reference grid, central-difference
//! gradients, and a full-table dynamic time warping aligner driven
//! by a pluggable local cost function.

mod align;
mod cost;
mod distance;
mod error;
mod gradient;
mod matrix;
mod path;
mod series;
mod signal;

pub use align::{Aligner, Alignment, PositionTerm};
pub use cost::{Cell, CostFn, CostModel, DerivativeMismatch, SquaredDifference};
pub use distance::DtwDistance;
pub use error::{DtwError, ResampleError, SignalError};
pub use gradient::gradient;
pub use matrix::CostMatrix;
pub use path::{WarpPath, WarpStep};
pub use series::{TimeSeries, TimeSeriesView};
pub use signal::{linspace, Signal};
