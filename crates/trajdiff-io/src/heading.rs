//! Heading branch correction.

/// Fold a raw heading from the 3D simulator's `(-180, 180]` yaw convention
/// into the traffic simulator's continuous compass range.
///
/// `-90 < v < 180` maps to `v + 90`, everything else to `v + 450`. Both
/// bounds are strict.
#[must_use]
pub fn correct_heading(v: f64) -> f64 {
    if -90.0 < v && v < 180.0 { v + 90.0 } else { v + 450.0 }
}

/// Apply [`correct_heading`] to every value in place.
pub fn correct_headings(values: &mut [f64]) {
    for v in values {
        *v = correct_heading(*v);
    }
}
