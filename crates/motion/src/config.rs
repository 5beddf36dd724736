//! Motion estimation configuration.

use crate::corners::CornerParams;
use crate::error::MotionError;
use crate::interpolate::Bandwidth;

/// Configuration for [`MotionEstimator`](crate::MotionEstimator).
#[derive(Debug, Clone, PartialEq)]
pub struct MotionConfig {
    intensity_floor: f64,
    opening_size: usize,
    corners: CornerParams,
    template_half: usize,
    search_radius: usize,
    max_speed: f64,
    iqr_multiplier: f64,
    apply_lower_bound: bool,
    decluster_radius: f64,
    min_samples: usize,
    bandwidth: Bandwidth,
    window_size: usize,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            intensity_floor: 0.0,
            opening_size: 5,
            corners: CornerParams::default(),
            template_half: 7,
            search_radius: 12,
            max_speed: 100.0 / 12.0,
            iqr_multiplier: 3.0,
            apply_lower_bound: false,
            decluster_radius: 20.0,
            min_samples: 3,
            bandwidth: Bandwidth::default(),
            window_size: 3,
        }
    }
}

impl MotionConfig {
    /// Configuration with reference defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value at or below which a pixel is background for the opening.
    pub fn with_intensity_floor(mut self, floor: f64) -> Self {
        self.intensity_floor = floor;
        self
    }

    /// Side of the square structuring element (pixels); 0 or 1 disables.
    pub fn with_opening_size(mut self, size: usize) -> Self {
        self.opening_size = size;
        self
    }

    /// Corner detector parameters.
    pub fn with_corners(mut self, corners: CornerParams) -> Self {
        self.corners = corners;
        self
    }

    /// Template half-size and search radius for tracking (pixels).
    pub fn with_tracking(mut self, template_half: usize, search_radius: usize) -> Self {
        self.template_half = template_half;
        self.search_radius = search_radius;
        self
    }

    /// Hard speed ceiling (pixels per step).
    pub fn with_max_speed(mut self, max_speed: f64) -> Self {
        self.max_speed = max_speed;
        self
    }

    /// IQR multiplier of the upper speed bound.
    pub fn with_iqr_multiplier(mut self, c: f64) -> Self {
        self.iqr_multiplier = c;
        self
    }

    /// Also drop samples below `max(0, median - 2 IQR)`.
    pub fn with_lower_bound(mut self, enabled: bool) -> Self {
        self.apply_lower_bound = enabled;
        self
    }

    /// Declustering cell size and minimum members.
    pub fn with_decluster(mut self, radius: f64, min_samples: usize) -> Self {
        self.decluster_radius = radius;
        self.min_samples = min_samples;
        self
    }

    /// Kernel bandwidth.
    pub fn with_bandwidth(mut self, bandwidth: Bandwidth) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    /// Number of batches pooled in the motion window.
    pub fn with_window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self
    }

    /// Background floor for the opening.
    pub fn intensity_floor(&self) -> f64 {
        self.intensity_floor
    }

    /// Opening element size.
    pub fn opening_size(&self) -> usize {
        self.opening_size
    }

    /// Corner parameters.
    pub fn corners(&self) -> &CornerParams {
        &self.corners
    }

    /// Template half-size.
    pub fn template_half(&self) -> usize {
        self.template_half
    }

    /// Search radius.
    pub fn search_radius(&self) -> usize {
        self.search_radius
    }

    /// Hard speed ceiling.
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// IQR multiplier.
    pub fn iqr_multiplier(&self) -> f64 {
        self.iqr_multiplier
    }

    /// Whether the lower speed bound is enforced.
    pub fn apply_lower_bound(&self) -> bool {
        self.apply_lower_bound
    }

    /// Declustering cell size.
    pub fn decluster_radius(&self) -> f64 {
        self.decluster_radius
    }

    /// Minimum samples per cluster and after declustering.
    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Kernel bandwidth.
    pub fn bandwidth(&self) -> Bandwidth {
        self.bandwidth
    }

    /// Motion window size.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Check that every parameter is in range.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::InvalidConfig`] naming the first bad parameter.
    pub fn validate(&self) -> Result<(), MotionError> {
        let invalid = |reason: String| Err(MotionError::InvalidConfig { reason });
        let c = &self.corners;

        if c.max_corners == 0 {
            return invalid("max corners must be at least 1".to_string());
        }
        if !(c.quality > 0.0 && c.quality < 1.0) {
            return invalid(format!("corner quality must be in (0, 1), got {}", c.quality));
        }
        if !(c.min_distance.is_finite() && c.min_distance >= 0.0) {
            return invalid(format!("min distance must be >= 0, got {}", c.min_distance));
        }
        if c.block_size < 3 {
            return invalid(format!("block size must be >= 3, got {}", c.block_size));
        }
        if self.template_half == 0 || self.search_radius == 0 {
            return invalid("template half-size and search radius must be >= 1".to_string());
        }
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return invalid(format!("max speed must be > 0, got {}", self.max_speed));
        }
        if !(self.iqr_multiplier.is_finite() && self.iqr_multiplier >= 0.0) {
            return invalid(format!("IQR multiplier must be >= 0, got {}", self.iqr_multiplier));
        }
        if !(self.decluster_radius.is_finite() && self.decluster_radius > 0.0) {
            return invalid(format!("decluster radius must be > 0, got {}", self.decluster_radius));
        }
        if self.min_samples == 0 {
            return invalid("minimum samples must be at least 1".to_string());
        }
        if let Bandwidth::Fixed(h) = self.bandwidth
            && !(h.is_finite() && h > 0.0)
        {
            return invalid(format!("kernel bandwidth must be > 0, got {h}"));
        }
        if self.window_size == 0 {
            return invalid("motion window size must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = MotionConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.min_samples(), 3);
        assert_eq!(c.window_size(), 3);
        assert_eq!(c.bandwidth(), Bandwidth::Fixed(100.0));
    }

    #[test]
    fn bad_bandwidth_rejected() {
        let c = MotionConfig::new().with_bandwidth(Bandwidth::Fixed(0.0));
        assert!(c.validate().is_err());
        let ok = MotionConfig::new().with_bandwidth(Bandwidth::Silverman);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn bad_quality_rejected() {
        let c = MotionConfig::new().with_corners(CornerParams {
            quality: 1.5,
            ..CornerParams::default()
        });
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("quality"));
    }

    #[test]
    fn zero_window_rejected() {
        assert!(MotionConfig::new().with_window_size(0).validate().is_err());
    }
}
