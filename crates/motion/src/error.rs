//! Error types for the nimbus-motion crate.

use crate::estimator::MotionDiagnostics;

/// Error type for all fallible operations in the nimbus-motion crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MotionError {
    /// Returned when a configuration parameter is out of range.
    #[error("invalid motion configuration: {reason}")]
    InvalidConfig {
        /// Description of the offending parameter.
        reason: String,
    },

    /// Returned when two fields (or two flow components) differ in shape.
    #[error("shape mismatch: {expected:?} vs {got:?}")]
    ShapeMismatch {
        /// Reference shape.
        expected: (usize, usize),
        /// Offending shape.
        got: (usize, usize),
    },

    /// Returned when a field has no pixels.
    #[error("field is empty")]
    EmptyField,

    /// Returned when too few vectors survive declustering to define a flow.
    #[error("insufficient motion samples: {found} after declustering, {required} required")]
    InsufficientSamples {
        /// Number of declustered samples.
        found: usize,
        /// Minimum required.
        required: usize,
        /// Counts from the stages before the failure.
        diagnostics: MotionDiagnostics,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_insufficient_samples() {
        let err = MotionError::InsufficientSamples {
            found: 1,
            required: 3,
            diagnostics: MotionDiagnostics::default(),
        };
        assert_eq!(
            err.to_string(),
            "insufficient motion samples: 1 after declustering, 3 required"
        );
    }

    #[test]
    fn display_shape_mismatch() {
        let err = MotionError::ShapeMismatch {
            expected: (4, 4),
            got: (4, 5),
        };
        assert_eq!(err.to_string(), "shape mismatch: (4, 4) vs (4, 5)");
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<MotionError>();
    }
}
