//! Spectral analysis configuration.

use crate::anisotropy::AnisotropySource;
use crate::error::SpectralError;
use crate::slope::Fitting;
use crate::window::Window;

/// Configuration for [`analyze_spectrum`](crate::analyze_spectrum).
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralConfig {
    resolution_km: f64,
    window: Window,
    scale_breaks: Vec<f64>,
    outer_km: f64,
    inner_km: f64,
    fitting: Fitting,
    anisotropy: AnisotropySource,
    percentile: f64,
    autocorr_half_size: usize,
    log_power_half_size: usize,
    smoothing_sigma: f64,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            resolution_km: 1.0,
            window: Window::None,
            scale_breaks: vec![12.0],
            outer_km: 512.0,
            inner_km: 4.0,
            fitting: Fitting::Ols,
            anisotropy: AnisotropySource::Autocorrelation,
            percentile: 90.0,
            autocorr_half_size: 255,
            log_power_half_size: 40,
            smoothing_sigma: 3.0,
        }
    }
}

impl SpectralConfig {
    /// Configuration with reference defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pixel size in km.
    pub fn with_resolution_km(mut self, km: f64) -> Self {
        self.resolution_km = km;
        self
    }

    /// Set the taper applied before the FFT.
    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Set the candidate scale breaks (km), tried in order.
    pub fn with_scale_breaks(mut self, breaks: Vec<f64>) -> Self {
        self.scale_breaks = breaks;
        self
    }

    /// Set the largest (`outer`) and smallest (`inner`) wavelengths fitted (km).
    pub fn with_scale_bounds(mut self, outer_km: f64, inner_km: f64) -> Self {
        self.outer_km = outer_km;
        self.inner_km = inner_km;
        self
    }

    /// Set OLS or weighted OLS fitting.
    pub fn with_fitting(mut self, fitting: Fitting) -> Self {
        self.fitting = fitting;
        self
    }

    /// Set the surface used for anisotropy.
    pub fn with_anisotropy(mut self, source: AnisotropySource) -> Self {
        self.anisotropy = source;
        self
    }

    /// Set the percentile above which anisotropy mass is counted.
    pub fn with_percentile(mut self, pct: f64) -> Self {
        self.percentile = pct;
        self
    }

    /// Set the Gaussian smoothing width for the log power surface (pixels).
    pub fn with_smoothing_sigma(mut self, sigma: f64) -> Self {
        self.smoothing_sigma = sigma;
        self
    }

    /// Pixel size in km.
    pub fn resolution_km(&self) -> f64 {
        self.resolution_km
    }

    /// Taper.
    pub fn window(&self) -> Window {
        self.window
    }

    /// Candidate scale breaks in km.
    pub fn scale_breaks(&self) -> &[f64] {
        &self.scale_breaks
    }

    /// Largest fitted wavelength in km.
    pub fn outer_km(&self) -> f64 {
        self.outer_km
    }

    /// Smallest fitted wavelength bound in km (exclusive).
    pub fn inner_km(&self) -> f64 {
        self.inner_km
    }

    /// Fitting flavour.
    pub fn fitting(&self) -> Fitting {
        self.fitting
    }

    /// Anisotropy surface.
    pub fn anisotropy(&self) -> AnisotropySource {
        self.anisotropy
    }

    /// Anisotropy mass percentile.
    pub fn percentile(&self) -> f64 {
        self.percentile
    }

    /// Half-size of the anisotropy window for the chosen surface.
    pub fn anisotropy_half_size(&self) -> usize {
        match self.anisotropy {
            AnisotropySource::Autocorrelation => self.autocorr_half_size,
            AnisotropySource::LogPower => self.log_power_half_size,
        }
    }

    /// Gaussian smoothing width for the log power surface.
    pub fn smoothing_sigma(&self) -> f64 {
        self.smoothing_sigma
    }

    /// Check that every parameter is in range.
    ///
    /// # Errors
    ///
    /// Returns [`SpectralError::InvalidConfig`] naming the first bad parameter.
    pub fn validate(&self) -> Result<(), SpectralError> {
        let invalid = |reason: String| Err(SpectralError::InvalidConfig { reason });

        if !(self.resolution_km.is_finite() && self.resolution_km > 0.0) {
            return invalid(format!("resolution must be > 0, got {}", self.resolution_km));
        }
        if !(self.inner_km.is_finite() && self.inner_km > 0.0) {
            return invalid(format!("inner bound must be > 0, got {}", self.inner_km));
        }
        if !(self.outer_km.is_finite() && self.outer_km > self.inner_km) {
            return invalid(format!(
                "outer bound {} must exceed inner bound {}",
                self.outer_km, self.inner_km
            ));
        }
        if self.scale_breaks.is_empty() {
            return invalid("at least one scale break is required".to_string());
        }
        if let Some(sb) = self
            .scale_breaks
            .iter()
            .find(|sb| !(sb.is_finite() && **sb > self.inner_km && **sb < self.outer_km))
        {
            return invalid(format!(
                "scale break {sb} outside ({}, {})",
                self.inner_km, self.outer_km
            ));
        }
        if !(self.percentile > 0.0 && self.percentile < 100.0) {
            return invalid(format!("percentile must be in (0, 100), got {}", self.percentile));
        }
        if !(self.smoothing_sigma.is_finite() && self.smoothing_sigma >= 0.0) {
            return invalid(format!("smoothing sigma must be >= 0, got {}", self.smoothing_sigma));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = SpectralConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.scale_breaks(), &[12.0]);
        assert_eq!(c.anisotropy_half_size(), 255);
    }

    #[test]
    fn log_power_uses_small_window() {
        let c = SpectralConfig::new().with_anisotropy(AnisotropySource::LogPower);
        assert_eq!(c.anisotropy_half_size(), 40);
    }

    #[test]
    fn empty_scale_breaks_rejected() {
        let c = SpectralConfig::new().with_scale_breaks(vec![]);
        assert!(matches!(c.validate(), Err(SpectralError::InvalidConfig { .. })));
    }

    #[test]
    fn scale_break_outside_bounds_rejected() {
        let c = SpectralConfig::new().with_scale_breaks(vec![12.0, 600.0]);
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("600"));
    }

    #[test]
    fn inverted_bounds_rejected() {
        let c = SpectralConfig::new().with_scale_bounds(4.0, 512.0);
        assert!(c.validate().is_err());
    }

    #[test]
    fn config_is_send_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<SpectralConfig>();
    }
}
