//! # nimbus-advect
//!
//! Predicts a rainfall field by moving a past field along a dense motion
//! field. [`Advector`] is the narrow interface the engine depends on;
//! [`SemiLagrangian`] is the default backward-trajectory implementation.
//!
//! ## Quick Start
//!
//! ```ignore
//! use nimbus_advect::{Advector, SemiLagrangian};
//!
//! let advector = SemiLagrangian::new(0.5)?;
//! let predictions = advector.advect(&previous, &flow, 2)?;
//! let lag1 = &predictions[0];
//! ```

mod advector;
mod error;
mod semi_lagrangian;

pub use advector::Advector;
pub use error::AdvectError;
pub use semi_lagrangian::{SemiLagrangian, sample_bilinear};
