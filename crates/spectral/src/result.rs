//! Spectral analysis output.

use ndarray::Array2;

use crate::anisotropy::Anisotropy;
use crate::radial::RadialProfile;
use crate::slope::{ScaleBreakFit, SlopeFit};

/// Radial spectrum plus derived slopes and anisotropy for one field.
#[derive(Debug, Clone)]
pub struct SpectralSummary {
    profile: RadialProfile,
    power_2d: Array2<f64>,
    best: Option<ScaleBreakFit>,
    anisotropy: Option<Anisotropy>,
}

impl SpectralSummary {
    pub(crate) fn new(
        profile: RadialProfile,
        power_2d: Array2<f64>,
        best: Option<ScaleBreakFit>,
        anisotropy: Option<Anisotropy>,
    ) -> Self {
        Self {
            profile,
            power_2d,
            best,
            anisotropy,
        }
    }

    /// Radially averaged power spectrum.
    pub fn profile(&self) -> &RadialProfile {
        &self.profile
    }

    /// Shifted 2D power spectrum `|F|^2 / S^2`.
    pub fn power_2d(&self) -> &Array2<f64> {
        &self.power_2d
    }

    /// Fits for the selected scale break.
    pub fn best_fit(&self) -> Option<&ScaleBreakFit> {
        self.best.as_ref()
    }

    /// Selected scale break in km.
    pub fn scale_break(&self) -> Option<f64> {
        self.best.map(|b| b.scale_break)
    }

    /// Large-scale regime fit.
    pub fn beta1(&self) -> Option<SlopeFit> {
        self.best.and_then(|b| b.large)
    }

    /// Small-scale regime fit.
    pub fn beta2(&self) -> Option<SlopeFit> {
        self.best.and_then(|b| b.small)
    }

    /// Anisotropy ellipse, if the surface had mass above the percentile.
    pub fn anisotropy(&self) -> Option<Anisotropy> {
        self.anisotropy
    }
}
