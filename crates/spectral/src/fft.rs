//! Two-dimensional FFT helpers on `ndarray` grids.
//!
//! Rows are transformed first, then columns on a transposed buffer so that
//! every pass works on contiguous memory. `rustfft` is unnormalized; the
//! inverse here divides by the number of pixels.

use ndarray::Array2;
use num_complex::Complex;
use rustfft::FftPlanner;

/// Transpose a row-major `rows x cols` buffer.
fn transpose(buf: &[Complex<f64>], rows: usize, cols: usize) -> Vec<Complex<f64>> {
    let mut out = vec![Complex::new(0.0, 0.0); buf.len()];
    for r in 0..rows {
        for c in 0..cols {
            out[c * rows + r] = buf[r * cols + c];
        }
    }
    out
}

fn transform(data: &Array2<Complex<f64>>, inverse: bool) -> Array2<Complex<f64>> {
    let (rows, cols) = data.dim();
    if rows == 0 || cols == 0 {
        return data.clone();
    }
    let mut planner = FftPlanner::new();
    let (row_fft, col_fft) = if inverse {
        (planner.plan_fft_inverse(cols), planner.plan_fft_inverse(rows))
    } else {
        (planner.plan_fft_forward(cols), planner.plan_fft_forward(rows))
    };

    // `process` handles a buffer holding several consecutive transforms.
    let mut buf: Vec<Complex<f64>> = data.iter().copied().collect();
    row_fft.process(&mut buf);
    let mut transposed = transpose(&buf, rows, cols);
    col_fft.process(&mut transposed);
    let mut out = transpose(&transposed, cols, rows);

    if inverse {
        let norm = 1.0 / (rows * cols) as f64;
        out.iter_mut().for_each(|c| *c *= norm);
    }

    Array2::from_shape_fn((rows, cols), |(r, c)| out[r * cols + c])
}

/// Forward 2D FFT of a real field.
pub fn fft2(data: &Array2<f64>) -> Array2<Complex<f64>> {
    transform(&data.mapv(|v| Complex::new(v, 0.0)), false)
}

/// Normalized inverse 2D FFT.
pub fn ifft2(spectrum: &Array2<Complex<f64>>) -> Array2<Complex<f64>> {
    transform(spectrum, true)
}

/// Move the zero-frequency element to index `(rows / 2, cols / 2)`.
pub fn fftshift<T: Copy>(data: &Array2<T>) -> Array2<T> {
    let (rows, cols) = data.dim();
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        data[[(r + rows - rows / 2) % rows, (c + cols - cols / 2) % cols]]
    })
}

/// Inverse of [`fftshift`].
pub fn ifftshift<T: Copy>(data: &Array2<T>) -> Array2<T> {
    let (rows, cols) = data.dim();
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        data[[(r + rows / 2) % rows, (c + cols / 2) % cols]]
    })
}

/// Sample frequencies for an FFT of length `n` with spacing `d`.
pub fn fftfreq(n: usize, d: f64) -> Vec<f64> {
    let val = 1.0 / (n as f64 * d);
    let n_half = n.div_ceil(2);
    let mut results: Vec<f64> = (0..n_half).map(|i| i as f64).collect();
    results.extend((-(n as isize / 2)..0).map(|i| i as f64));
    results.iter_mut().for_each(|x| *x *= val);
    results
}

/// Shifted power spectrum `|F|^2 / S^2` with the zero frequency at the centre.
pub fn power_spectrum(data: &Array2<f64>) -> Array2<f64> {
    let n = data.len() as f64;
    fftshift(&fft2(data).mapv(|c| c.norm_sqr() / n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn dc_component_is_sum() {
        let data = array![[1.0, 2.0], [3.0, 4.0]];
        let f = fft2(&data);
        assert_abs_diff_eq!(f[[0, 0]].re, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(f[[0, 0]].im, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn shift_and_unshift_are_inverse() {
        let data = Array2::from_shape_fn((5, 4), |(r, c)| (r * 4 + c) as f64);
        let back = ifftshift(&fftshift(&data));
        assert_eq!(back, data);
    }

    #[test]
    fn shift_moves_origin_to_centre() {
        let mut data = Array2::zeros((6, 6));
        data[[0, 0]] = 1.0;
        let s = fftshift(&data);
        assert_eq!(s[[3, 3]], 1.0);
    }

    #[test]
    fn fftfreq_even() {
        let f = fftfreq(4, 1.0);
        assert_eq!(f, vec![0.0, 0.25, -0.5, -0.25]);
    }

    #[test]
    fn roundtrip_non_square() {
        let data = Array2::from_shape_fn((3, 5), |(r, c)| (r as f64).sin() + c as f64);
        let back = ifft2(&fft2(&data));
        for (a, b) in data.iter().zip(back.iter()) {
            assert_abs_diff_eq!(*a, b.re, epsilon = 1e-10);
            assert_abs_diff_eq!(b.im, 0.0, epsilon = 1e-10);
        }
    }
}
