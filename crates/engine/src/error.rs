//! Error types for the nimbus-engine crate.

use nimbus_advect::AdvectError;
use nimbus_field::FieldError;
use nimbus_motion::MotionError;
use nimbus_spectral::SpectralError;

/// Error type for all fallible operations in the nimbus-engine crate.
///
/// Dry and unreadable fields are not errors; they surface as
/// [`StepOutcome::Reset`](crate::StepOutcome::Reset). Too few motion samples
/// is recorded on the timestep, not returned.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// Returned when the engine configuration is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Field handling error.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Spectral analysis error.
    #[error(transparent)]
    Spectral(#[from] SpectralError),

    /// Motion estimation error.
    #[error(transparent)]
    Motion(#[from] MotionError),

    /// Advection error.
    #[error(transparent)]
    Advect(#[from] AdvectError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_config() {
        let err = EngineError::InvalidConfig {
            reason: "max_lag must be >= 1".into(),
        };
        assert_eq!(err.to_string(), "invalid configuration: max_lag must be >= 1");
    }

    #[test]
    fn field_error_transparent() {
        let err = EngineError::from(FieldError::ZeroCapacity);
        assert_eq!(err.to_string(), FieldError::ZeroCapacity.to_string());
    }

    #[test]
    fn advect_error_transparent() {
        let err = EngineError::from(AdvectError::ZeroSteps);
        assert_eq!(err.to_string(), "advection needs at least one step");
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<EngineError>();
    }
}
