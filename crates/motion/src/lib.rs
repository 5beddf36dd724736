//! # nimbus-motion
//!
//! Apparent motion between two consecutive radar fields, from sparse
//! feature tracks to a dense per-pixel displacement field.
//!
//! ## Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["older, newer"] -->|"open_above() + rescale()"| B["0..255 images"]
//!     B -->|"detect_corners()"| C["Shi-Tomasi corners"]
//!     C -->|"track_corners()"| D["MotionSample"]
//!     D -->|"filter_by_speed()"| E["filtered batch"]
//!     E -->|"MotionWindow::push()"| F["pooled samples"]
//!     F -->|"decluster()"| G["representatives"]
//!     G -->|"interpolate_flow()"| H["DenseFlowField"]
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use nimbus_motion::{MotionConfig, MotionEstimator, MotionWindow};
//!
//! let estimator = MotionEstimator::new(MotionConfig::new().with_intensity_floor(fill_dbz))?;
//! let mut window = MotionWindow::new(3)?;
//! let estimate = estimator.estimate(&previous, &current, &mut window)?;
//! println!("bandwidth = {}", estimate.bandwidth());
//! ```

mod config;
mod corners;
mod decluster;
mod error;
mod estimator;
mod filter;
mod flow;
mod interpolate;
mod morphology;
mod sample;
mod tracking;
mod window;

pub use config::MotionConfig;
pub use corners::{Corner, CornerParams, corner_response, detect_corners};
pub use decluster::decluster;
pub use error::MotionError;
pub use estimator::{MotionDiagnostics, MotionEstimate, MotionEstimator};
pub use filter::{SpeedFilterOutcome, filter_by_speed};
pub use flow::{DenseFlowField, resize_bilinear};
pub use interpolate::{Bandwidth, interpolate_flow, silverman_bandwidth};
pub use morphology::{joint_range, open_above, rescale};
pub use sample::MotionSample;
pub use tracking::track_corners;
pub use window::MotionWindow;
