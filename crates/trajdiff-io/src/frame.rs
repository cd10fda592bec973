//! Planar coordinate frame calibration between simulators.

use serde::{Deserialize, Serialize};

/// Maps positions from one simulator's frame into another's:
/// `x' = x + x_offset`, `y' = (flip_y ? -y : y) + y_offset`.
///
/// The offsets are scenario calibration constants and come from
/// configuration. [`FrameTransform::default`] is the identity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameTransform {
    /// Added to every x coordinate.
    #[serde(default)]
    pub x_offset: f64,
    /// Added to every (possibly mirrored) y coordinate.
    #[serde(default)]
    pub y_offset: f64,
    /// Mirror the y axis before offsetting.
    #[serde(default)]
    pub flip_y: bool,
}

impl FrameTransform {
    /// Transform with the given offsets and y mirroring.
    #[must_use]
    pub fn new(x_offset: f64, y_offset: f64, flip_y: bool) -> Self {
        Self {
            x_offset,
            y_offset,
            flip_y,
        }
    }

    /// Map an x coordinate.
    #[must_use]
    pub fn apply_x(&self, x: f64) -> f64 {
        x + self.x_offset
    }

    /// Map a y coordinate.
    #[must_use]
    pub fn apply_y(&self, y: f64) -> f64 {
        let y = if self.flip_y { -y } else { y };
        y + self.y_offset
    }

    /// Map a point.
    #[must_use]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.apply_x(x), self.apply_y(y))
    }
}
