//! Error types for the nimbus-advect crate.

/// Error type for all fallible operations in the nimbus-advect crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdvectError {
    /// Returned when the flow downscale factor is not in `(0, 1]`.
    #[error("invalid downscale factor: {value} (must be in (0, 1])")]
    InvalidDownscale {
        /// The rejected factor.
        value: f64,
    },

    /// Returned when zero advection steps are requested.
    #[error("advection needs at least one step")]
    ZeroSteps,

    /// Returned when the source field or the flow field has no pixels.
    #[error("empty {what}")]
    Empty {
        /// Which input was empty.
        what: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_downscale() {
        let err = AdvectError::InvalidDownscale { value: 2.0 };
        assert_eq!(
            err.to_string(),
            "invalid downscale factor: 2 (must be in (0, 1])"
        );
    }

    #[test]
    fn display_empty() {
        let err = AdvectError::Empty { what: "flow field" };
        assert_eq!(err.to_string(), "empty flow field");
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<AdvectError>();
    }
}
