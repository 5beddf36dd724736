//! Error types for nimbus-io.

use std::path::PathBuf;

/// Error type for all fallible operations in the nimbus-io crate.
///
/// Covers file system failures, malformed ASCII grids, Parquet output
/// problems and invalid reader or writer settings.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps a file system error.
    #[error("i/o error on {}: {reason}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Description of the underlying failure.
        reason: String,
    },

    /// Returned when an ASCII grid cannot be parsed.
    #[error("invalid ascii grid: {reason}")]
    Grid {
        /// Description of the parse failure.
        reason: String,
    },

    /// Wraps an error originating from the Parquet or Arrow libraries.
    #[error("parquet error: {reason}")]
    Parquet {
        /// Description of the underlying Parquet failure.
        reason: String,
    },

    /// Returned when one or more validation checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Returned when a dimension has an unexpected size.
    #[error("dimension '{name}' mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Name of the dimension.
        name: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },
}

impl IoError {
    pub(crate) fn io(path: impl Into<PathBuf>, e: std::io::Error) -> Self {
        let path = path.into();
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound { path }
        } else {
            IoError::Io {
                path,
                reason: e.to_string(),
            }
        }
    }
}

impl From<parquet::errors::ParquetError> for IoError {
    fn from(e: parquet::errors::ParquetError) -> Self {
        IoError::Parquet {
            reason: e.to_string(),
        }
    }
}

impl From<arrow::error::ArrowError> for IoError {
    fn from(e: arrow::error::ArrowError) -> Self {
        IoError::Parquet {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_file_not_found() {
        let err = IoError::FileNotFound {
            path: PathBuf::from("/tmp/missing.asc"),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/missing.asc");
    }

    #[test]
    fn display_grid() {
        let err = IoError::Grid {
            reason: "missing ncols".to_string(),
        };
        assert_eq!(err.to_string(), "invalid ascii grid: missing ncols");
    }

    #[test]
    fn display_dimension_mismatch() {
        let err = IoError::DimensionMismatch {
            name: "rows".to_string(),
            expected: 512,
            got: 480,
        };
        assert_eq!(
            err.to_string(),
            "dimension 'rows' mismatch: expected 512, got 480"
        );
    }

    #[test]
    fn not_found_kind_maps_to_file_not_found() {
        let e = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(IoError::io("/x", e), IoError::FileNotFound { .. }));
        let e = std::io::Error::other("disk full");
        let err = IoError::io("/x", e);
        assert_eq!(err.to_string(), "i/o error on /x: disk full");
    }

    #[test]
    fn from_parquet_error() {
        let pq_err = parquet::errors::ParquetError::General("test pq error".to_string());
        let err: IoError = pq_err.into();
        assert!(matches!(err, IoError::Parquet { .. }));
        assert!(err.to_string().contains("test pq error"));
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<IoError>();
    }
}
