//! End-to-end spectral analysis of one field.

use ndarray::Array2;
use tracing::debug;

use crate::anisotropy::{AnisotropySource, anisotropy_from_autocorrelation, anisotropy_from_log_power};
use crate::config::SpectralConfig;
use crate::error::SpectralError;
use crate::fft::power_spectrum;
use crate::radial::radial_average;
use crate::result::SpectralSummary;
use crate::slope::fit_best_scale_break;

/// Compute the power spectrum, radial profile, slopes and anisotropy of a
/// square, fully finite field.
///
/// # Errors
///
/// Returns [`SpectralError::InvalidConfig`] for a bad configuration,
/// [`SpectralError::EmptyField`], [`SpectralError::NotSquare`] or
/// [`SpectralError::NonFinite`] for unusable input.
#[tracing::instrument(skip_all, fields(size = field.nrows()))]
pub fn analyze_spectrum(
    field: &Array2<f64>,
    config: &SpectralConfig,
) -> Result<SpectralSummary, SpectralError> {
    config.validate()?;

    let (rows, cols) = field.dim();
    if field.is_empty() {
        return Err(SpectralError::EmptyField);
    }
    if rows != cols {
        return Err(SpectralError::NotSquare { rows, cols });
    }
    let count = field.iter().filter(|v| !v.is_finite()).count();
    if count > 0 {
        return Err(SpectralError::NonFinite { count });
    }

    let windowed = config.window().apply(field);
    let psd = power_spectrum(&windowed);
    let profile = radial_average(&psd, config.resolution_km());

    let best = fit_best_scale_break(
        &profile,
        config.scale_breaks(),
        config.outer_km(),
        config.inner_km(),
        config.fitting(),
    );

    let anisotropy = match config.anisotropy() {
        AnisotropySource::Autocorrelation => anisotropy_from_autocorrelation(
            &windowed,
            config.anisotropy_half_size(),
            config.percentile(),
        ),
        AnisotropySource::LogPower => anisotropy_from_log_power(
            &psd,
            config.anisotropy_half_size(),
            config.percentile(),
            config.smoothing_sigma(),
        ),
    };

    debug!(
        scale_break = ?best.map(|b| b.scale_break),
        beta1 = ?best.and_then(|b| b.large).map(|f| f.beta),
        beta2 = ?best.and_then(|b| b.small).map(|f| f.beta),
        eccentricity = ?anisotropy.map(|a| a.eccentricity()),
        "spectrum analysed"
    );

    Ok(SpectralSummary::new(profile, psd, best, anisotropy))
}
