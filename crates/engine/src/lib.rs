//! # nimbus-engine
//!
//! Sequential analysis of a stream of radar rainfall fields. Each wet
//! field is summarised, its power spectrum analysed, and, once two
//! consecutive wet fields are held, the motion between them is estimated
//! and used to score Eulerian against Lagrangian persistence.
//!
//! ## Timestep Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["FieldInput"] -->|"condition + WAR gate"| B{"wet?"}
//!     B -->|"no"| R["reset -> Cold"]
//!     B -->|"yes"| C["dBZ field"]
//!     C -->|"analyze_spectrum()"| D["SpectralRecord"]
//!     C -->|"MotionEstimator"| E["DenseFlowField"]
//!     E -->|"Advector"| F["predictions"]
//!     F -->|"Pearson"| G["CorrelationSummary"]
//!     D --> H["TimestepRecord"]
//!     G --> H
//! ```
//!
//! ## States
//!
//! | State | Fields held | Analyses |
//! |-------|-------------|----------|
//! | `Cold` | 0 | none |
//! | `Warming` | 1 | wetness, statistics, spectrum |
//! | `Tracking` | >= 2 | all, including motion and correlation |
//!
//! ## Quick Start
//!
//! ```ignore
//! use nimbus_engine::{EngineConfig, FieldInput, RunController};
//!
//! let mut controller = RunController::new(EngineConfig::default())?;
//! let stop = controller.stop_handle().clone();
//! for record in controller.records(inputs) {
//!     let record = record?;
//!     println!("{} lag-1 Lagrangian {:?}", record.timestamp, record.correlation.lagrangian_at(1));
//! }
//! ```

mod config;
mod controller;
mod correlation;
mod error;
mod input;
mod record;
mod state;
mod stop;

pub use config::{AnalysisMode, EngineConfig, SpectralVariable};
pub use controller::{ResetReason, RunController, StepOutcome};
pub use correlation::{CorrelationSummary, eulerian, field_correlation, lagrangian};
pub use error::EngineError;
pub use input::{FieldInput, Records};
pub use record::{MotionRecord, MotionStatus, SpectralRecord, TimestepRecord};
pub use state::RunState;
pub use stop::StopHandle;
