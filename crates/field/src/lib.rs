//! # nimbus-field
//!
//! Rainfall fields and the bookkeeping that every temporal statistic relies
//! on: conditioning raw rain rates, converting them to reflectivity, the
//! wetted-area-ratio gate, per-field summary statistics, and the rolling
//! most-recent-first [`FieldStack`].
//!
//! Fields are square `ndarray::Array2<f64>` grids; missing pixels are NaN.
//!
//! ```text
//! raw grid ──condition_rainfall()──▶ rain (mm/h) ──WetnessClassifier──▶ wet?
//!                                      │                                 │
//!                                      ├──ZrRelation::field_to_dbz()     └──▶ FieldStack::push()
//!                                      └──summarize()
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use nimbus_field::{FieldStack, WetnessClassifier, condition_rainfall};
//!
//! let rain = condition_rainfall(&raw, 0.08, -999.0);
//! let gate = WetnessClassifier::new(0.08)?;
//! let mut stack = FieldStack::new(12)?;
//! if gate.classify(&rain).is_wet() {
//!     stack.push(rain)?;
//! } else {
//!     stack.clear();
//! }
//! ```

mod error;
mod stack;
mod summary;
mod wetness;
mod zr;

pub use error::FieldError;
pub use stack::FieldStack;
pub use summary::{FieldSummary, summarize, summarize_with_mask};
pub use wetness::{DEFAULT_MIN_WAR, Wetness, WetnessClassifier};
pub use zr::{FillPolicy, ZrRelation, condition_rainfall};

/// Value marking missing pixels in raw radar archives.
pub const NO_DATA: f64 = -999.0;
