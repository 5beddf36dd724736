//! The per-timestep run controller.

use std::collections::VecDeque;

use chrono::NaiveDateTime;
use nimbus_advect::{Advector, SemiLagrangian};
use nimbus_field::{
    FieldStack, NO_DATA, WetnessClassifier, condition_rainfall, summarize, summarize_with_mask,
};
use nimbus_motion::{DenseFlowField, MotionError, MotionEstimator, MotionWindow};
use nimbus_spectral::analyze_spectrum;
use tracing::{debug, info, warn};

use crate::config::{EngineConfig, SpectralVariable};
use crate::correlation::{CorrelationSummary, eulerian, lagrangian};
use crate::error::EngineError;
use crate::input::{FieldInput, Records};
use crate::record::{MotionRecord, SpectralRecord, TimestepRecord};
use crate::state::RunState;
use crate::stop::StopHandle;

/// Why a timestep discarded the history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResetReason {
    /// The field could not be read.
    Unreadable,
    /// The wetted area ratio was below the minimum.
    Dry {
        /// Wetted area ratio of the rejected field.
        war: f64,
    },
}

/// Result of one [`RunController::step`].
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// The field was wet and analysed.
    Record(Box<TimestepRecord>),
    /// The field was rejected and all history was discarded.
    Reset {
        /// Timestamp of the rejected field.
        timestamp: NaiveDateTime,
        /// Why the field was rejected.
        reason: ResetReason,
    },
}

/// Drives the timestep loop and owns all rolling state of a run.
///
/// The field stack holds reflectivity fields with missing and dry pixels
/// set to the configured fill value. Motion is estimated between the two
/// newest fields; the motion window pools tracked vectors across recent
/// pairs. A dry or unreadable field clears both buffers.
///
/// # Example
///
/// ```ignore
/// use nimbus_engine::{EngineConfig, FieldInput, RunController};
///
/// let mut controller = RunController::new(EngineConfig::default())?;
/// for record in controller.records(inputs) {
///     let record = record?;
///     println!("{} WAR={:.3}", record.timestamp, record.war);
/// }
/// ```
pub struct RunController {
    config: EngineConfig,
    classifier: WetnessClassifier,
    estimator: MotionEstimator,
    advector: Box<dyn Advector>,
    fill: f64,
    stack: FieldStack,
    window: MotionWindow,
    flows: VecDeque<(NaiveDateTime, DenseFlowField)>,
    stop: StopHandle,
}

impl RunController {
    /// Create a controller in the [`RunState::Cold`] state.
    ///
    /// The motion estimator's intensity floor is set to the fill value so
    /// that filled pixels count as background.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the configuration is invalid.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let fill = config.fill_value();
        let classifier = WetnessClassifier::with_min_war(config.threshold(), config.min_war())?;
        let estimator =
            MotionEstimator::new(config.motion().clone().with_intensity_floor(fill))?;
        let advector = Box::new(SemiLagrangian::new(config.downscale())?);
        let stack = FieldStack::new(config.stack_capacity())?;
        let window = MotionWindow::new(config.motion().window_size())?;

        Ok(Self {
            config,
            classifier,
            estimator,
            advector,
            fill,
            stack,
            window,
            flows: VecDeque::new(),
            stop: StopHandle::new(),
        })
    }

    /// Replace the advection scheme.
    pub fn with_advector(mut self, advector: Box<dyn Advector>) -> Self {
        self.advector = advector;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current history state.
    pub fn state(&self) -> RunState {
        RunState::from_history(self.stack.len())
    }

    /// The field history, newest first.
    pub fn stack(&self) -> &FieldStack {
        &self.stack
    }

    /// The motion vector window.
    pub fn motion_window(&self) -> &MotionWindow {
        &self.window
    }

    /// Retained flow fields, oldest first.
    pub fn flows(&self) -> impl Iterator<Item = &(NaiveDateTime, DenseFlowField)> {
        self.flows.iter()
    }

    /// Most recent retained flow field.
    pub fn latest_flow(&self) -> Option<&(NaiveDateTime, DenseFlowField)> {
        self.flows.back()
    }

    /// Handle that halts [`RunController::records`] between timesteps.
    pub fn stop_handle(&self) -> &StopHandle {
        &self.stop
    }

    /// Discard the field history and the motion window.
    ///
    /// Retained flow fields are kept for export.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.window.clear();
    }

    /// Lazily analyse `inputs`, yielding one record per wet timestep.
    pub fn records<I>(&mut self, inputs: I) -> Records<'_, I::IntoIter>
    where
        I: IntoIterator<Item = FieldInput>,
    {
        Records::new(self, inputs.into_iter())
    }

    /// Process one timestep.
    ///
    /// Spectral analysis of the new field runs concurrently with motion
    /// estimation between the previous and the new field. Advection and
    /// correlation follow once the flow is known.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the field cannot join the stack (shape
    /// change) or an analysis fails on valid input. Dry and unreadable
    /// fields are reported as [`StepOutcome::Reset`] instead.
    #[tracing::instrument(skip_all, fields(timestamp = %input.timestamp))]
    pub fn step(&mut self, input: FieldInput) -> Result<StepOutcome, EngineError> {
        let FieldInput { timestamp, field } = input;
        let Some(raw) = field else {
            warn!("field unreadable, resetting history");
            self.reset();
            return Ok(StepOutcome::Reset {
                timestamp,
                reason: ResetReason::Unreadable,
            });
        };

        let threshold = self.config.threshold();
        let rain = condition_rainfall(&raw, threshold, NO_DATA);
        let wetness = self.classifier.classify(&rain);
        if !wetness.is_wet() {
            info!(war = wetness.war(), "dry field, resetting history");
            self.reset();
            return Ok(StepOutcome::Reset {
                timestamp,
                reason: ResetReason::Dry { war: wetness.war() },
            });
        }

        let dbz = self.config.zr().field_to_dbz(&rain, self.fill);
        self.stack.check(&dbz)?;
        let rain_stats = summarize(&rain, threshold);
        let dbz_stats = summarize_with_mask(&dbz, &rain, threshold);

        let rain_filled = match self.config.spectral_variable() {
            SpectralVariable::Dbz => None,
            SpectralVariable::RainRate => Some(rain.mapv(|r| if r.is_finite() { r } else { 0.0 })),
        };
        let spectral_field = rain_filled.as_ref().unwrap_or(&dbz);

        let mode = self.config.mode();
        let spectral_config = self.config.spectral();
        let estimator = &self.estimator;
        let window = &mut self.window;
        let motion_pair = self.stack.latest().filter(|_| mode.runs_motion());

        let (spectral, motion) = rayon::join(
            || {
                mode.runs_spectral()
                    .then(|| analyze_spectrum(spectral_field, spectral_config))
                    .transpose()
            },
            || motion_pair.map(|older| estimator.estimate(older, &dbz, window)),
        );
        let spectral = spectral?;

        self.stack.push(dbz)?;
        let state = self.state();

        let (motion, flow) = match motion {
            None => (MotionRecord::default(), None),
            Some(Ok(estimate)) => {
                let record = MotionRecord::estimated(&estimate);
                (record, Some(estimate.into_flow()))
            }
            Some(Err(MotionError::InsufficientSamples {
                found,
                required,
                diagnostics,
            })) => {
                warn!(found, required, "too few motion samples, motion undefined");
                (MotionRecord::insufficient(&diagnostics), None)
            }
            Some(Err(e)) => return Err(e.into()),
        };

        let max_lag = self.config.max_lag();
        let correlation = if state == RunState::Tracking {
            let eul = eulerian(&self.stack, max_lag);
            let lagr = match &flow {
                Some(flow) => lagrangian(&self.stack, flow, self.advector.as_ref(), max_lag)?,
                None => vec![None; max_lag],
            };
            CorrelationSummary::new(eul, lagr)
        } else {
            CorrelationSummary::undefined(max_lag)
        };

        if let Some(flow) = flow {
            self.retain_flow(timestamp, flow);
        }

        let spectral = spectral.as_ref().map(SpectralRecord::from);
        info!(
            state = %state,
            war = wetness.war(),
            beta1 = ?spectral.and_then(|s| s.beta1),
            beta2 = ?spectral.and_then(|s| s.beta2),
            eulerian = ?correlation.eulerian_at(1),
            lagrangian = ?correlation.lagrangian_at(1),
            "timestep analysed"
        );
        debug!(
            motion = motion.status.as_str(),
            samples = motion.n_declustered,
            bandwidth = ?motion.bandwidth,
            scale_break = ?spectral.and_then(|s| s.scale_break),
            "timestep details"
        );

        Ok(StepOutcome::Record(Box::new(TimestepRecord {
            timestamp,
            state,
            war: wetness.war(),
            rain: rain_stats,
            dbz: dbz_stats,
            spectral,
            motion,
            correlation,
        })))
    }

    fn retain_flow(&mut self, timestamp: NaiveDateTime, flow: DenseFlowField) {
        let keep = self.config.flow_retention();
        if keep == 0 {
            return;
        }
        while self.flows.len() >= keep {
            self.flows.pop_front();
        }
        self.flows.push_back((timestamp, flow));
    }
}
