//! Run configuration.

use nimbus_field::{DEFAULT_MIN_WAR, FillPolicy, ZrRelation};
use nimbus_motion::MotionConfig;
use nimbus_spectral::SpectralConfig;

use crate::error::EngineError;

/// Which unit the spectral analyzer sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpectralVariable {
    /// Reflectivity, with missing and dry pixels filled per [`FillPolicy`].
    #[default]
    Dbz,
    /// Rain rate, with missing pixels set to zero.
    RainRate,
}

/// Which analyses run on a wet timestep. Chosen once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    /// Spectral and motion analyses.
    #[default]
    Both,
    /// Spectral analysis only; no motion, advection or Lagrangian correlation.
    Spectral,
    /// Motion, advection and correlation only.
    Motion,
}

impl AnalysisMode {
    /// Whether the spectral analyzer runs.
    pub fn runs_spectral(self) -> bool {
        matches!(self, Self::Both | Self::Spectral)
    }

    /// Whether motion, advection and Lagrangian correlation run.
    pub fn runs_motion(self) -> bool {
        matches!(self, Self::Both | Self::Motion)
    }
}

/// Configuration for a [`RunController`](crate::RunController).
///
/// # Example
///
/// ```ignore
/// use nimbus_engine::{AnalysisMode, EngineConfig};
///
/// let config = EngineConfig::new()
///     .with_threshold(0.1)
///     .with_max_lag(2)
///     .with_mode(AnalysisMode::Motion);
/// config.validate()?;
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    stack_capacity: usize,
    threshold: f64,
    min_war: f64,
    zr: ZrRelation,
    fill: FillPolicy,
    variable: SpectralVariable,
    mode: AnalysisMode,
    max_lag: usize,
    flow_retention: usize,
    downscale: f64,
    spectral: SpectralConfig,
    motion: MotionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stack_capacity: 12,
            threshold: 0.08,
            min_war: DEFAULT_MIN_WAR,
            zr: ZrRelation::default(),
            fill: FillPolicy::default(),
            variable: SpectralVariable::default(),
            mode: AnalysisMode::default(),
            max_lag: 1,
            flow_retention: 288,
            downscale: 0.5,
            spectral: SpectralConfig::default(),
            motion: MotionConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Configuration with the reference defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field stack capacity K.
    pub fn with_stack_capacity(mut self, capacity: usize) -> Self {
        self.stack_capacity = capacity;
        self
    }

    /// Sets the rain threshold in mm/h.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the minimum wetted area ratio for a wet timestep.
    pub fn with_min_war(mut self, min_war: f64) -> Self {
        self.min_war = min_war;
        self
    }

    /// Sets the Z-R relationship.
    pub fn with_zr(mut self, zr: ZrRelation) -> Self {
        self.zr = zr;
        self
    }

    /// Sets the fill policy for missing and dry reflectivity pixels.
    pub fn with_fill(mut self, fill: FillPolicy) -> Self {
        self.fill = fill;
        self
    }

    /// Sets the unit analysed by the spectral analyzer.
    pub fn with_spectral_variable(mut self, variable: SpectralVariable) -> Self {
        self.variable = variable;
        self
    }

    /// Sets the analysis mode.
    pub fn with_mode(mut self, mode: AnalysisMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the largest correlation lag.
    pub fn with_max_lag(mut self, max_lag: usize) -> Self {
        self.max_lag = max_lag;
        self
    }

    /// Sets how many dense flow fields are retained for export.
    pub fn with_flow_retention(mut self, n: usize) -> Self {
        self.flow_retention = n;
        self
    }

    /// Sets the flow downscale factor used for advection.
    pub fn with_downscale(mut self, factor: f64) -> Self {
        self.downscale = factor;
        self
    }

    /// Sets the spectral analyzer configuration.
    pub fn with_spectral(mut self, spectral: SpectralConfig) -> Self {
        self.spectral = spectral;
        self
    }

    /// Sets the motion estimator configuration.
    pub fn with_motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }

    /// Returns the field stack capacity.
    pub fn stack_capacity(&self) -> usize {
        self.stack_capacity
    }

    /// Returns the rain threshold (mm/h).
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the minimum wetted area ratio.
    pub fn min_war(&self) -> f64 {
        self.min_war
    }

    /// Returns the Z-R relationship.
    pub fn zr(&self) -> ZrRelation {
        self.zr
    }

    /// Returns the fill policy.
    pub fn fill(&self) -> FillPolicy {
        self.fill
    }

    /// Reflectivity written to missing and dry pixels.
    pub fn fill_value(&self) -> f64 {
        self.fill.resolve(self.threshold, &self.zr)
    }

    /// Returns the spectral variable.
    pub fn spectral_variable(&self) -> SpectralVariable {
        self.variable
    }

    /// Returns the analysis mode.
    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    /// Returns the largest correlation lag.
    pub fn max_lag(&self) -> usize {
        self.max_lag
    }

    /// Returns the number of retained flow fields.
    pub fn flow_retention(&self) -> usize {
        self.flow_retention
    }

    /// Returns the flow downscale factor.
    pub fn downscale(&self) -> f64 {
        self.downscale
    }

    /// Returns the spectral configuration.
    pub fn spectral(&self) -> &SpectralConfig {
        &self.spectral
    }

    /// Returns the motion configuration.
    pub fn motion(&self) -> &MotionConfig {
        &self.motion
    }

    /// Check every parameter, including the nested configurations.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] for engine parameters and the
    /// wrapped spectral or motion error for nested ones.
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |reason: String| Err(EngineError::InvalidConfig { reason });

        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return invalid(format!("rain threshold must be > 0, got {}", self.threshold));
        }
        if !(0.0..=1.0).contains(&self.min_war) {
            return invalid(format!("minimum WAR must be in [0, 1], got {}", self.min_war));
        }
        if self.max_lag == 0 {
            return invalid("max_lag must be >= 1".to_string());
        }
        if self.stack_capacity <= self.max_lag {
            return invalid(format!(
                "stack capacity {} must exceed max_lag {}",
                self.stack_capacity, self.max_lag
            ));
        }
        if !(self.downscale > 0.0 && self.downscale <= 1.0) {
            return invalid(format!("downscale must be in (0, 1], got {}", self.downscale));
        }
        if let FillPolicy::Value(v) = self.fill
            && !v.is_finite()
        {
            return invalid(format!("fill value must be finite, got {v}"));
        }
        self.spectral.validate()?;
        self.motion.validate()?;
        Ok(())
    }
}
