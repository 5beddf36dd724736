//! Separable tapers applied before the Fourier transform.

use std::f64::consts::PI;

use ndarray::Array2;

/// Window function applied to the field before the FFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    /// No tapering.
    #[default]
    None,
    /// Hann (raised cosine) taper.
    Hann,
    /// Blackman taper.
    Blackman,
}

impl Window {
    /// 1D window coefficients of length `n` (symmetric form).
    pub fn coefficients(&self, n: usize) -> Vec<f64> {
        if n < 2 {
            return vec![1.0; n];
        }
        let m = (n - 1) as f64;
        (0..n)
            .map(|i| {
                let x = i as f64 / m;
                match self {
                    Window::None => 1.0,
                    Window::Hann => 0.5 - 0.5 * (2.0 * PI * x).cos(),
                    Window::Blackman => {
                        0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
                    }
                }
            })
            .collect()
    }

    /// Apply the outer product of row and column windows to `field`.
    pub fn apply(&self, field: &Array2<f64>) -> Array2<f64> {
        if *self == Window::None {
            return field.clone();
        }
        let (rows, cols) = field.dim();
        let wr = self.coefficients(rows);
        let wc = self.coefficients(cols);
        Array2::from_shape_fn((rows, cols), |(r, c)| field[[r, c]] * wr[r] * wc[c])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn none_is_identity() {
        let f = Array2::from_elem((4, 4), 3.0);
        assert_eq!(Window::None.apply(&f), f);
    }

    #[test]
    fn blackman_endpoints_and_peak() {
        let w = Window::Blackman.coefficients(9);
        assert_abs_diff_eq!(w[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(w[8], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(w[4], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn hann_is_symmetric() {
        let w = Window::Hann.coefficients(8);
        for i in 0..4 {
            assert_abs_diff_eq!(w[i], w[7 - i], epsilon = 1e-12);
        }
    }

    #[test]
    fn taper_zeroes_edges() {
        let f = Array2::from_elem((5, 5), 2.0);
        let t = Window::Hann.apply(&f);
        assert_abs_diff_eq!(t[[0, 2]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(t[[2, 2]], 2.0, epsilon = 1e-12);
    }
}
