//! Error types for nimbus-field.

/// Error type for all fallible operations in the nimbus-field crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    /// Returned when a rain threshold is negative or non-finite.
    #[error("invalid rain threshold: {value} (must be finite and >= 0)")]
    InvalidThreshold {
        /// The rejected threshold.
        value: f64,
    },

    /// Returned when the minimum wetted-area ratio is outside `[0, 1]`.
    #[error("invalid minimum WAR: {value} (must be in [0, 1])")]
    InvalidMinWar {
        /// The rejected ratio.
        value: f64,
    },

    /// Returned when Z-R coefficients are not strictly positive.
    #[error("invalid Z-R coefficients: a={a}, b={b} (both must be > 0)")]
    InvalidZr {
        /// Multiplicative coefficient.
        a: f64,
        /// Exponent.
        b: f64,
    },

    /// Returned when a field stack is created with zero capacity.
    #[error("field stack capacity must be at least 1")]
    ZeroCapacity,

    /// Returned when a field is not square.
    #[error("field must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// Returned when a field does not match the shape of fields already stacked.
    #[error("field shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Shape of the fields already in the stack.
        expected: (usize, usize),
        /// Shape of the rejected field.
        got: (usize, usize),
    },
}
