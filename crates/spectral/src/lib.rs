//! # nimbus-spectral
//!
//! Scale-dependent energy distribution of a rainfall field: 2D power
//! spectrum, radially averaged 1D spectrum, two-regime spectral slopes with
//! adaptive scale-break selection, and anisotropy of the spectral energy.
//!
//! ## Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["field (dBZ)"] -->|"Window::apply()"| B["tapered field"]
//!     B -->|"power_spectrum()"| C["|F|²/S², shifted"]
//!     C -->|"radial_average()"| D["RadialProfile"]
//!     D -->|"fit_best_scale_break()"| E["β1, β2, scale break"]
//!     B -->|"autocorrelation"| F["Anisotropy"]
//!     C -->|"log power"| F
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use nimbus_spectral::{SpectralConfig, Fitting, analyze_spectrum};
//!
//! let config = SpectralConfig::new()
//!     .with_scale_breaks(vec![8.0, 12.0, 20.0])
//!     .with_fitting(Fitting::Wols);
//! let summary = analyze_spectrum(&dbz, &config)?;
//! if let Some(beta1) = summary.beta1() {
//!     println!("beta1 = {:.2} (r = {:.3})", beta1.beta, beta1.r);
//! }
//! ```

mod analyze;
mod anisotropy;
mod config;
mod error;
mod fft;
mod radial;
mod result;
mod slope;
mod window;

pub use analyze::analyze_spectrum;
pub use anisotropy::{Anisotropy, AnisotropySource, autocorrelation, ellipse_from_surface};
pub use config::SpectralConfig;
pub use error::SpectralError;
pub use fft::{fft2, fftfreq, fftshift, ifft2, ifftshift, power_spectrum};
pub use radial::{RadialProfile, radial_average};
pub use result::SpectralSummary;
pub use slope::{Fitting, ScaleBreakFit, SlopeFit, fit_best_scale_break, fit_regime, select_best};
pub use window::Window;
