//! Two-regime log-log slope fitting and scale-break selection.

use nimbus_stats::{line_fit, weighted_line_fit};

use crate::radial::RadialProfile;

/// Least-squares flavour used for the slope regressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fitting {
    /// Ordinary least squares.
    #[default]
    Ols,
    /// Weighted least squares with weights `n, n-1, ..., 1` by increasing
    /// frequency, emphasising the large scales.
    Wols,
}

/// Linear fit of `10 log10(power)` against `10 log10(frequency)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeFit {
    /// Spectral slope.
    pub beta: f64,
    /// Intercept in dB.
    pub intercept: f64,
    /// Correlation coefficient of the regression.
    pub r: f64,
    /// Number of spectral bins used.
    pub n: usize,
}

/// Both regimes fitted for one candidate scale break.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBreakFit {
    /// Candidate scale break (km).
    pub scale_break: f64,
    /// Large-scale regime, wavelengths in `(scale_break, outer]`.
    pub large: Option<SlopeFit>,
    /// Small-scale regime, wavelengths in `(inner, scale_break]`.
    pub small: Option<SlopeFit>,
}

impl ScaleBreakFit {
    /// Selection score `|r_large| + |r_small|`; an undefined regime
    /// contributes nothing.
    pub fn score(&self) -> f64 {
        self.large.map_or(0.0, |f| f.r.abs()) + self.small.map_or(0.0, |f| f.r.abs())
    }
}

/// Fit one regime over bins with wavelength in `(lower_km, upper_km]`.
///
/// Returns `None` when fewer than 2 usable bins fall in the range.
pub fn fit_regime(
    profile: &RadialProfile,
    upper_km: f64,
    lower_km: f64,
    fitting: Fitting,
) -> Option<SlopeFit> {
    let (x, y): (Vec<f64>, Vec<f64>) = profile
        .frequencies()
        .iter()
        .zip(profile.wavelengths())
        .zip(profile.power())
        .filter(|((f, wl), p)| {
            **wl <= upper_km && **wl > lower_km && **f > 0.0 && **p > 0.0 && p.is_finite()
        })
        .map(|((f, _), p)| (10.0 * f.log10(), 10.0 * p.log10()))
        .unzip();

    let fit = match fitting {
        Fitting::Ols => line_fit(&x, &y),
        Fitting::Wols => {
            let n = x.len();
            let weights: Vec<f64> = (0..n).map(|i| (n - i) as f64).collect();
            weighted_line_fit(&x, &y, &weights)
        }
    };

    fit.map(|fit| SlopeFit {
        beta: fit.slope,
        intercept: fit.intercept,
        r: fit.r,
        n: fit.n,
    })
}

/// Fit both regimes for a single scale break.
pub fn fit_scale_break(
    profile: &RadialProfile,
    scale_break: f64,
    outer_km: f64,
    inner_km: f64,
    fitting: Fitting,
) -> ScaleBreakFit {
    ScaleBreakFit {
        scale_break,
        large: fit_regime(profile, outer_km, scale_break, fitting),
        small: fit_regime(profile, scale_break, inner_km, fitting),
    }
}

/// Pick the fit with the highest [`ScaleBreakFit::score`].
///
/// On an exact tie the earliest candidate wins. Returns `None` for an
/// empty input.
pub fn select_best<I>(fits: I) -> Option<ScaleBreakFit>
where
    I: IntoIterator<Item = ScaleBreakFit>,
{
    fits.into_iter().fold(None, |best: Option<ScaleBreakFit>, fit| match best {
        Some(b) if b.score() >= fit.score() => Some(b),
        _ => Some(fit),
    })
}

/// Fit every candidate scale break and keep the best.
pub fn fit_best_scale_break(
    profile: &RadialProfile,
    scale_breaks: &[f64],
    outer_km: f64,
    inner_km: f64,
    fitting: Fitting,
) -> Option<ScaleBreakFit> {
    select_best(
        scale_breaks
            .iter()
            .map(|&sb| fit_scale_break(profile, sb, outer_km, inner_km, fitting)),
    )
}
