//! Time-indexed archive of ASCII grid rainfall fields.

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};
use ndarray::Array2;
use nimbus_engine::FieldInput;
use tracing::{debug, warn};

use crate::ascii_grid::{extract_middle_domain, read_ascii_grid};
use crate::error::IoError;

/// Where fields live and how they are named.
///
/// A field at time `t` is read from `<dir>/<prefix><YYYYMMDDHHMM>.<extension>`.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    dir: PathBuf,
    prefix: String,
    extension: String,
    step: Duration,
    domain_size: Option<usize>,
}

impl ArchiveConfig {
    /// Archive in `dir` with no prefix, `.asc` files and a 5 minute step.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: String::new(),
            extension: "asc".to_string(),
            step: Duration::minutes(5),
            domain_size: None,
        }
    }

    /// Sets the file name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the file extension (without dot).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Sets the interval between fields.
    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    /// Crop every field to its central `size` x `size` window.
    pub fn with_domain_size(mut self, size: Option<usize>) -> Self {
        self.domain_size = size;
        self
    }

    /// Returns the archive directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the interval between fields.
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Returns the cropped domain size, if any.
    pub fn domain_size(&self) -> Option<usize> {
        self.domain_size
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] listing every problem found.
    pub fn validate(&self) -> Result<(), IoError> {
        let mut problems = Vec::new();
        if self.step <= Duration::zero() {
            problems.push(format!("step must be positive, got {}", self.step));
        }
        if self.domain_size == Some(0) {
            problems.push("domain size must be at least 1".to_string());
        }
        if self.extension.is_empty() {
            problems.push("extension must not be empty".to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(IoError::Validation {
                count: problems.len(),
                details: problems.join("; "),
            })
        }
    }
}

/// Reader producing [`FieldInput`]s from an [`ArchiveConfig`].
#[derive(Debug, Clone)]
pub struct GridArchive {
    config: ArchiveConfig,
}

impl GridArchive {
    /// Open an archive.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] for an invalid configuration and
    /// [`IoError::FileNotFound`] if the directory does not exist.
    pub fn new(config: ArchiveConfig) -> Result<Self, IoError> {
        config.validate()?;
        if !config.dir.is_dir() {
            return Err(IoError::FileNotFound { path: config.dir });
        }
        Ok(Self { config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// File holding the field at `timestamp`.
    pub fn path_for(&self, timestamp: NaiveDateTime) -> PathBuf {
        let c = &self.config;
        c.dir.join(format!(
            "{}{}.{}",
            c.prefix,
            timestamp.format("%Y%m%d%H%M"),
            c.extension
        ))
    }

    /// Read the field at `timestamp`, cropped to the configured domain.
    /// Missing cells are NaN.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`] if the file is missing, unparsable or smaller
    /// than the domain.
    pub fn read_field(&self, timestamp: NaiveDateTime) -> Result<Array2<f64>, IoError> {
        let grid = read_ascii_grid(&self.path_for(timestamp))?;
        match self.config.domain_size {
            Some(size) => extract_middle_domain(grid.data(), size),
            None => Ok(grid.into_data()),
        }
    }

    /// Input for `timestamp`; any read failure yields an unreadable input.
    pub fn load(&self, timestamp: NaiveDateTime) -> FieldInput {
        match self.read_field(timestamp) {
            Ok(field) => FieldInput::valid(timestamp, field),
            Err(IoError::FileNotFound { path }) => {
                debug!(path = %path.display(), "field missing");
                FieldInput::unreadable(timestamp)
            }
            Err(e) => {
                warn!(%timestamp, error = %e, "field unreadable");
                FieldInput::unreadable(timestamp)
            }
        }
    }

    /// Timestamps from `start` to `end` inclusive, one step apart.
    pub fn timestamps(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> impl Iterator<Item = NaiveDateTime> {
        let step = self.config.step;
        std::iter::successors(Some(start), move |t| Some(*t + step)).take_while(move |t| *t <= end)
    }

    /// Lazily load every field from `start` to `end` inclusive.
    pub fn inputs(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> impl Iterator<Item = FieldInput> + '_ {
        self.timestamps(start, end).map(move |t| self.load(t))
    }
}
