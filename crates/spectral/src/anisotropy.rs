//! Anisotropy of the power spectrum from weighted second moments.
//!
//! A central window of either the spatial autocorrelation or the log power
//! spectrum is thresholded at a percentile; values above it act as mass
//! whose covariance matrix defines an ellipse.

use ndarray::{Array2, s};
use nimbus_stats::percentile;

use crate::fft::{fft2, fftshift, ifft2};

/// Which 2D surface the anisotropy ellipse is fitted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnisotropySource {
    /// Spatial autocorrelation (inverse transform of the power spectrum).
    #[default]
    Autocorrelation,
    /// Smoothed log power spectrum.
    LogPower,
}

/// Principal axes of the thresholded mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anisotropy {
    eccentricity: f64,
    orientation_deg: f64,
    major: f64,
    minor: f64,
}

impl Anisotropy {
    /// `1 - minor / major`, 0 for an isotropic surface.
    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    /// Angle of the major axis in degrees, counter-clockwise from the
    /// column axis with rows pointing south, in `(-90, 90]`.
    pub fn orientation_deg(&self) -> f64 {
        self.orientation_deg
    }

    /// Variance along the major axis (pixels²).
    pub fn major(&self) -> f64 {
        self.major
    }

    /// Variance along the minor axis (pixels²).
    pub fn minor(&self) -> f64 {
        self.minor
    }
}

/// Autocorrelation of `field` normalized to 1 at zero lag, centred.
///
/// Returns `None` for a constant field.
pub fn autocorrelation(field: &Array2<f64>) -> Option<Array2<f64>> {
    let mean = field.mean()?;
    let anomalies = field.mapv(|v| v - mean);
    let power = fft2(&anomalies).mapv(|c| num_complex::Complex::new(c.norm_sqr(), 0.0));
    let acf = fftshift(&ifft2(&power).mapv(|c| c.re));
    let (rows, cols) = acf.dim();
    let zero_lag = acf[[rows / 2, cols / 2]];
    if zero_lag <= 0.0 || !zero_lag.is_finite() {
        return None;
    }
    Some(acf.mapv(|v| v / zero_lag))
}

fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (4.0 * sigma).ceil() as isize;
    let kernel: Vec<f64> = (-radius..=radius)
        .map(|i| (-(i * i) as f64 / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f64 = kernel.iter().sum();
    kernel.into_iter().map(|k| k / sum).collect()
}

/// Separable Gaussian smoothing with edge clamping.
pub fn gaussian_smooth(data: &Array2<f64>, sigma: f64) -> Array2<f64> {
    if sigma <= 0.0 {
        return data.clone();
    }
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;
    let (rows, cols) = data.dim();
    let clamp = |i: isize, n: usize| i.clamp(0, n as isize - 1) as usize;

    let horizontal = Array2::from_shape_fn((rows, cols), |(r, c)| {
        kernel
            .iter()
            .enumerate()
            .map(|(k, w)| w * data[[r, clamp(c as isize + k as isize - radius, cols)]])
            .sum::<f64>()
    });
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        kernel
            .iter()
            .enumerate()
            .map(|(k, w)| w * horizontal[[clamp(r as isize + k as isize - radius, rows), c]])
            .sum::<f64>()
    })
}

/// Fit the anisotropy ellipse to a centred surface.
///
/// The window spans `half_size` pixels on each side of the centre. Mass is
/// `value - threshold` for values above the `pct` percentile of the window.
pub fn ellipse_from_surface(surface: &Array2<f64>, half_size: usize, pct: f64) -> Option<Anisotropy> {
    let (rows, cols) = surface.dim();
    if rows == 0 || cols == 0 {
        return None;
    }
    let (cr, cc) = (rows / 2, cols / 2);
    let h = half_size.min(cr).min(cc).min(rows - cr - 1).min(cols - cc - 1);
    if h == 0 {
        return None;
    }
    let window = surface.slice(s![cr - h..=cr + h, cc - h..=cc + h]);
    let values: Vec<f64> = window.iter().copied().collect();
    let threshold = percentile(&values, pct)?;

    let mut mass = 0.0;
    let (mut sx, mut sy) = (0.0, 0.0);
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for ((r, c), &v) in window.indexed_iter() {
        if !v.is_finite() || v <= threshold {
            continue;
        }
        let w = v - threshold;
        let x = c as f64 - h as f64;
        let y = h as f64 - r as f64;
        mass += w;
        sx += w * x;
        sy += w * y;
        sxx += w * x * x;
        syy += w * y * y;
        sxy += w * x * y;
    }
    if mass <= 0.0 {
        return None;
    }

    let (mx, my) = (sx / mass, sy / mass);
    let a = sxx / mass - mx * mx;
    let c = syy / mass - my * my;
    let b = sxy / mass - mx * my;

    let half_trace = 0.5 * (a + c);
    let disc = (0.25 * (a - c) * (a - c) + b * b).sqrt();
    let major = half_trace + disc;
    let minor = (half_trace - disc).max(0.0);
    if major <= 0.0 || !major.is_finite() {
        return None;
    }

    let mut orientation_deg = 0.5 * (2.0 * b).atan2(a - c).to_degrees();
    if orientation_deg <= -90.0 {
        orientation_deg += 180.0;
    }

    Some(Anisotropy {
        eccentricity: 1.0 - minor / major,
        orientation_deg,
        major,
        minor,
    })
}

/// Anisotropy of `field` (already windowed) from its autocorrelation.
pub fn anisotropy_from_autocorrelation(
    field: &Array2<f64>,
    half_size: usize,
    pct: f64,
) -> Option<Anisotropy> {
    let acf = autocorrelation(field)?;
    ellipse_from_surface(&acf, half_size, pct)
}

/// Anisotropy from the shifted power spectrum in decibels, smoothed with
/// a Gaussian of width `sigma` pixels.
pub fn anisotropy_from_log_power(
    psd_shifted: &Array2<f64>,
    half_size: usize,
    pct: f64,
    sigma: f64,
) -> Option<Anisotropy> {
    let floor = psd_shifted
        .iter()
        .copied()
        .filter(|p| *p > 0.0 && p.is_finite())
        .fold(f64::INFINITY, f64::min);
    if !floor.is_finite() {
        return None;
    }
    let log_power = psd_shifted.mapv(|p| 10.0 * p.max(floor).log10());
    ellipse_from_surface(&gaussian_smooth(&log_power, sigma), half_size, pct)
}
