//! The full motion pipeline between two consecutive fields.

use ndarray::Array2;
use tracing::debug;

use crate::config::MotionConfig;
use crate::corners::detect_corners;
use crate::decluster::decluster;
use crate::error::MotionError;
use crate::filter::filter_by_speed;
use crate::flow::DenseFlowField;
use crate::interpolate::interpolate_flow;
use crate::morphology::{joint_range, open_above, rescale};
use crate::tracking::track_corners;
use crate::window::MotionWindow;

/// Sample counts and thresholds from one estimation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionDiagnostics {
    /// Corners detected on the older field.
    pub n_corners: usize,
    /// Corners successfully tracked.
    pub n_tracked: usize,
    /// Tracked vectors surviving the speed filter.
    pub n_filtered: usize,
    /// Vectors pooled across the motion window.
    pub n_pooled: usize,
    /// Representatives left after declustering.
    pub n_declustered: usize,
    /// Upper speed bound applied (pixels per step).
    pub speed_upper: Option<f64>,
    /// Lower speed bound computed (pixels per step).
    pub speed_lower: Option<f64>,
    /// Median tracked speed (pixels per step).
    pub median_speed: Option<f64>,
}

/// A dense flow estimate with its diagnostics.
#[derive(Debug, Clone)]
pub struct MotionEstimate {
    flow: DenseFlowField,
    bandwidth: f64,
    diagnostics: MotionDiagnostics,
}

impl MotionEstimate {
    /// Dense flow on the input grid.
    pub fn flow(&self) -> &DenseFlowField {
        &self.flow
    }

    /// Consume into the dense flow.
    pub fn into_flow(self) -> DenseFlowField {
        self.flow
    }

    /// Kernel bandwidth used (grid units).
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Stage counts.
    pub fn diagnostics(&self) -> &MotionDiagnostics {
        &self.diagnostics
    }
}

/// Sparse-to-dense motion estimator.
#[derive(Debug, Clone)]
pub struct MotionEstimator {
    config: MotionConfig,
}

impl MotionEstimator {
    /// Create an estimator after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::InvalidConfig`] for an invalid configuration.
    pub fn new(config: MotionConfig) -> Result<Self, MotionError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Estimate motion from `older` to `newer`.
    ///
    /// The filtered vectors of this pair are pushed into `window` before
    /// pooling, also when the estimate ends up undefined.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::ShapeMismatch`] or [`MotionError::EmptyField`]
    /// for unusable input and [`MotionError::InsufficientSamples`] when fewer
    /// than `min_samples` representatives survive declustering.
    #[tracing::instrument(skip_all, fields(window = window.len()))]
    pub fn estimate(
        &self,
        older: &Array2<f64>,
        newer: &Array2<f64>,
        window: &mut MotionWindow,
    ) -> Result<MotionEstimate, MotionError> {
        if older.dim() != newer.dim() {
            return Err(MotionError::ShapeMismatch {
                expected: older.dim(),
                got: newer.dim(),
            });
        }
        if older.is_empty() {
            return Err(MotionError::EmptyField);
        }
        let cfg = &self.config;

        let floor = cfg.intensity_floor();
        let a = open_above(older, floor, cfg.opening_size());
        let b = open_above(newer, floor, cfg.opening_size());
        let (lo, hi) = joint_range([&a, &b]).unwrap_or((0.0, 0.0));
        let a = rescale(&a, lo, hi);
        let b = rescale(&b, lo, hi);

        let corners = detect_corners(&a, cfg.corners());
        let tracked = track_corners(&a, &b, &corners, cfg.template_half(), cfg.search_radius());
        let filtered = filter_by_speed(
            &tracked,
            cfg.max_speed(),
            cfg.iqr_multiplier(),
            cfg.apply_lower_bound(),
        );

        let mut diagnostics = MotionDiagnostics {
            n_corners: corners.len(),
            n_tracked: tracked.len(),
            n_filtered: filtered.kept.len(),
            speed_upper: filtered.upper,
            speed_lower: filtered.lower,
            median_speed: filtered.median,
            ..MotionDiagnostics::default()
        };

        window.push(filtered.kept);
        let pooled = window.pooled();
        let representatives = decluster(&pooled, cfg.decluster_radius(), cfg.min_samples());
        diagnostics.n_pooled = pooled.len();
        diagnostics.n_declustered = representatives.len();

        debug!(
            corners = diagnostics.n_corners,
            tracked = diagnostics.n_tracked,
            filtered = diagnostics.n_filtered,
            pooled = diagnostics.n_pooled,
            declustered = diagnostics.n_declustered,
            "motion samples"
        );

        if representatives.len() < cfg.min_samples() {
            return Err(MotionError::InsufficientSamples {
                found: representatives.len(),
                required: cfg.min_samples(),
                diagnostics,
            });
        }

        let (flow, bandwidth) =
            interpolate_flow(&representatives, older.dim(), 1.0, cfg.bandwidth())?;

        Ok(MotionEstimate {
            flow,
            bandwidth,
            diagnostics,
        })
    }
}
