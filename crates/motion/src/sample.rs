//! Sparse motion vectors.

/// One tracked point: position and displacement per field interval, in
/// grid units. `x` and `u` run along columns (east), `y` and `v` along
/// rows (south).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    /// Column of the feature in the older field.
    pub x: f64,
    /// Row of the feature in the older field.
    pub y: f64,
    /// Column displacement.
    pub u: f64,
    /// Row displacement.
    pub v: f64,
}

impl MotionSample {
    /// Create a sample.
    pub fn new(x: f64, y: f64, u: f64, v: f64) -> Self {
        Self { x, y, u, v }
    }

    /// Displacement magnitude.
    pub fn speed(&self) -> f64 {
        self.u.hypot(self.v)
    }
}
