//! Error types for the nimbus-spectral crate.

/// Error type for all fallible operations in the nimbus-spectral crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpectralError {
    /// Returned when the input field has no pixels.
    #[error("input field is empty")]
    EmptyField,

    /// Returned when the input field is not square.
    #[error("field must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// Returned when the field still contains missing values after filling.
    #[error("field contains {count} non-finite value(s)")]
    NonFinite {
        /// Number of NaN or infinite pixels.
        count: usize,
    },

    /// Returned when a configuration parameter is out of range.
    #[error("invalid spectral configuration: {reason}")]
    InvalidConfig {
        /// Description of the offending parameter.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_not_square() {
        let err = SpectralError::NotSquare { rows: 3, cols: 4 };
        assert_eq!(err.to_string(), "field must be square, got 3x4");
    }

    #[test]
    fn display_non_finite() {
        let err = SpectralError::NonFinite { count: 7 };
        assert_eq!(err.to_string(), "field contains 7 non-finite value(s)");
    }

    #[test]
    fn display_invalid_config() {
        let err = SpectralError::InvalidConfig {
            reason: "no scale breaks".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid spectral configuration: no scale breaks"
        );
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<SpectralError>();
    }
}
