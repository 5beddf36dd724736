//! Dense (per-pixel) motion field.

use ndarray::{Array2, Zip};

use crate::error::MotionError;

/// Column (`u`) and row (`v`) displacement per field interval on a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseFlowField {
    u: Array2<f64>,
    v: Array2<f64>,
}

impl DenseFlowField {
    /// Build from components of equal shape.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::ShapeMismatch`] if the shapes differ.
    pub fn new(u: Array2<f64>, v: Array2<f64>) -> Result<Self, MotionError> {
        if u.dim() != v.dim() {
            return Err(MotionError::ShapeMismatch {
                expected: u.dim(),
                got: v.dim(),
            });
        }
        Ok(Self { u, v })
    }

    /// A motionless field.
    pub fn zeros(shape: (usize, usize)) -> Self {
        Self {
            u: Array2::zeros(shape),
            v: Array2::zeros(shape),
        }
    }

    /// A spatially uniform field.
    pub fn uniform(shape: (usize, usize), u: f64, v: f64) -> Self {
        Self {
            u: Array2::from_elem(shape, u),
            v: Array2::from_elem(shape, v),
        }
    }

    /// Column displacement (positive east).
    pub fn u(&self) -> &Array2<f64> {
        &self.u
    }

    /// Row displacement (positive south).
    pub fn v(&self) -> &Array2<f64> {
        &self.v
    }

    /// Row displacement with north positive, as exported.
    pub fn v_north(&self) -> Array2<f64> {
        self.v.mapv(|x| -x)
    }

    /// Grid shape `(rows, cols)`.
    pub fn dim(&self) -> (usize, usize) {
        self.u.dim()
    }

    /// Per-pixel speed.
    pub fn magnitude(&self) -> Array2<f64> {
        let mut mag = Array2::zeros(self.u.dim());
        Zip::from(&mut mag)
            .and(&self.u)
            .and(&self.v)
            .for_each(|m, &u, &v| *m = u.hypot(v));
        mag
    }

    /// Mean `(u, v)` over the grid.
    pub fn mean_motion(&self) -> (f64, f64) {
        (
            self.u.mean().unwrap_or(0.0),
            self.v.mean().unwrap_or(0.0),
        )
    }

    /// Resample both components bilinearly onto a grid scaled by `factor`.
    ///
    /// Displacements keep their original (full-resolution pixel) units.
    pub fn resized(&self, factor: f64) -> Self {
        let (rows, cols) = self.dim();
        let new_rows = ((rows as f64 * factor).round() as usize).max(1);
        let new_cols = ((cols as f64 * factor).round() as usize).max(1);
        Self {
            u: resize_bilinear(&self.u, new_rows, new_cols),
            v: resize_bilinear(&self.v, new_rows, new_cols),
        }
    }
}

/// Bilinear resampling of `src` to `rows x cols`, aligning pixel centres.
pub fn resize_bilinear(src: &Array2<f64>, rows: usize, cols: usize) -> Array2<f64> {
    let (sr, sc) = src.dim();
    if sr == 0 || sc == 0 {
        return Array2::zeros((rows, cols));
    }
    let scale_r = sr as f64 / rows as f64;
    let scale_c = sc as f64 / cols as f64;
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let y = ((r as f64 + 0.5) * scale_r - 0.5).clamp(0.0, (sr - 1) as f64);
        let x = ((c as f64 + 0.5) * scale_c - 0.5).clamp(0.0, (sc - 1) as f64);
        let y0 = y.floor() as usize;
        let x0 = x.floor() as usize;
        let y1 = (y0 + 1).min(sr - 1);
        let x1 = (x0 + 1).min(sc - 1);
        let fy = y - y0 as f64;
        let fx = x - x0 as f64;
        src[[y0, x0]] * (1.0 - fx) * (1.0 - fy)
            + src[[y0, x1]] * fx * (1.0 - fy)
            + src[[y1, x0]] * (1.0 - fx) * fy
            + src[[y1, x1]] * fx * fy
    })
}
