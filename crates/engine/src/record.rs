//! Per-timestep output records.

use chrono::NaiveDateTime;
use nimbus_field::FieldSummary;
use nimbus_motion::{MotionDiagnostics, MotionEstimate};
use nimbus_spectral::SpectralSummary;
use serde::Serialize;

use crate::correlation::CorrelationSummary;
use crate::state::RunState;

/// Outcome of the motion estimator on a timestep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionStatus {
    /// Motion was not attempted (history too short or mode excludes it).
    #[default]
    NotRun,
    /// Too few samples survived declustering; motion is undefined.
    Insufficient,
    /// A dense flow field was produced.
    Estimated,
}

impl MotionStatus {
    /// Lowercase name, as written to output files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotRun => "notrun",
            Self::Insufficient => "insufficient",
            Self::Estimated => "estimated",
        }
    }
}

/// Spectral scalars of one timestep. Undefined regimes stay `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SpectralRecord {
    /// Selected scale break (km).
    pub scale_break: Option<f64>,
    /// Large-scale slope.
    pub beta1: Option<f64>,
    /// Large-scale intercept (dB).
    pub intercept1: Option<f64>,
    /// Large-scale correlation coefficient.
    pub r_beta1: Option<f64>,
    /// Small-scale slope.
    pub beta2: Option<f64>,
    /// Small-scale intercept (dB).
    pub intercept2: Option<f64>,
    /// Small-scale correlation coefficient.
    pub r_beta2: Option<f64>,
    /// Anisotropy eccentricity `1 - minor/major`.
    pub eccentricity: Option<f64>,
    /// Orientation of the major axis in degrees.
    pub orientation: Option<f64>,
}

impl From<&SpectralSummary> for SpectralRecord {
    fn from(s: &SpectralSummary) -> Self {
        let b1 = s.beta1();
        let b2 = s.beta2();
        let an = s.anisotropy();
        Self {
            scale_break: s.scale_break(),
            beta1: b1.map(|f| f.beta),
            intercept1: b1.map(|f| f.intercept),
            r_beta1: b1.map(|f| f.r),
            beta2: b2.map(|f| f.beta),
            intercept2: b2.map(|f| f.intercept),
            r_beta2: b2.map(|f| f.r),
            eccentricity: an.map(|a| a.eccentricity()),
            orientation: an.map(|a| a.orientation_deg()),
        }
    }
}

/// Motion outcome and sample counts of one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MotionRecord {
    /// Estimator outcome.
    pub status: MotionStatus,
    /// Corners detected.
    pub n_corners: usize,
    /// Corners tracked.
    pub n_tracked: usize,
    /// Vectors kept by the speed filter.
    pub n_filtered: usize,
    /// Vectors pooled across the motion window.
    pub n_pooled: usize,
    /// Representatives after declustering.
    pub n_declustered: usize,
    /// Upper speed bound (pixels per step).
    pub speed_upper: Option<f64>,
    /// Median tracked speed (pixels per step).
    pub median_speed: Option<f64>,
    /// Kernel bandwidth used for interpolation.
    pub bandwidth: Option<f64>,
    /// Domain-mean eastward motion (pixels per step).
    pub mean_u: Option<f64>,
    /// Domain-mean northward motion (pixels per step).
    pub mean_v: Option<f64>,
}

impl MotionRecord {
    fn with_diagnostics(status: MotionStatus, d: &MotionDiagnostics) -> Self {
        Self {
            status,
            n_corners: d.n_corners,
            n_tracked: d.n_tracked,
            n_filtered: d.n_filtered,
            n_pooled: d.n_pooled,
            n_declustered: d.n_declustered,
            speed_upper: d.speed_upper,
            median_speed: d.median_speed,
            ..Self::default()
        }
    }

    /// Record for a successful estimate.
    pub fn estimated(estimate: &MotionEstimate) -> Self {
        let (u, v) = estimate.flow().mean_motion();
        Self {
            bandwidth: Some(estimate.bandwidth()),
            mean_u: Some(u),
            mean_v: Some(-v),
            ..Self::with_diagnostics(MotionStatus::Estimated, estimate.diagnostics())
        }
    }

    /// Record for an estimate with too few samples.
    pub fn insufficient(diagnostics: &MotionDiagnostics) -> Self {
        Self::with_diagnostics(MotionStatus::Insufficient, diagnostics)
    }
}

/// Everything computed for one wet timestep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimestepRecord {
    /// Field timestamp.
    pub timestamp: NaiveDateTime,
    /// Controller state after accepting the field.
    pub state: RunState,
    /// Wetted area ratio.
    pub war: f64,
    /// Rain-rate statistics (mm/h).
    pub rain: FieldSummary,
    /// Reflectivity statistics (dBZ).
    pub dbz: FieldSummary,
    /// Spectral scalars; `None` when the mode excludes spectral analysis.
    pub spectral: Option<SpectralRecord>,
    /// Motion outcome.
    pub motion: MotionRecord,
    /// Eulerian and Lagrangian correlations by lag.
    pub correlation: CorrelationSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names() {
        assert_eq!(MotionStatus::default(), MotionStatus::NotRun);
        assert_eq!(MotionStatus::Insufficient.as_str(), "insufficient");
    }

    #[test]
    fn insufficient_keeps_counts_but_no_flow() {
        let d = MotionDiagnostics {
            n_corners: 4,
            n_tracked: 2,
            ..MotionDiagnostics::default()
        };
        let m = MotionRecord::insufficient(&d);
        assert_eq!(m.status, MotionStatus::Insufficient);
        assert_eq!(m.n_corners, 4);
        assert_eq!(m.bandwidth, None);
        assert_eq!(m.mean_u, None);
    }
}
