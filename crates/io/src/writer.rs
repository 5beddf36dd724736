//! Parquet output of timestep statistics.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use nimbus_engine::TimestepRecord;
use parquet::file::properties::WriterProperties;
use tracing::debug;

use crate::error::IoError;
use crate::parquet_write;
use crate::sink::BatchSink;

/// Compression algorithm for Parquet output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    /// No compression.
    None,
    /// Snappy compression (fast, moderate ratio).
    #[default]
    Snappy,
    /// Zstd compression (slower, better ratio).
    Zstd,
}

impl Compression {
    /// Converts to the corresponding `parquet::basic::Compression` variant.
    fn to_parquet(self) -> Result<parquet::basic::Compression, IoError> {
        Ok(match self {
            Self::None => parquet::basic::Compression::UNCOMPRESSED,
            Self::Snappy => parquet::basic::Compression::SNAPPY,
            Self::Zstd => parquet::basic::Compression::ZSTD(parquet::basic::ZstdLevel::try_new(3)?),
        })
    }
}

/// Configuration for writing statistics to Parquet.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    compression: Compression,
    row_group_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            row_group_size: 100_000,
        }
    }
}

impl WriterConfig {
    /// Sets the compression algorithm.
    pub fn with_compression(mut self, comp: Compression) -> Self {
        self.compression = comp;
        self
    }

    /// Sets the maximum number of rows per row group.
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Returns the compression algorithm.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if `row_group_size` is zero.
    pub fn validate(&self) -> Result<(), IoError> {
        if self.row_group_size == 0 {
            return Err(IoError::Validation {
                count: 1,
                details: "row_group_size must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    fn properties(&self) -> Result<WriterProperties, IoError> {
        Ok(WriterProperties::builder()
            .set_compression(self.compression.to_parquet()?)
            .set_max_row_group_size(self.row_group_size)
            .build())
    }
}

/// Write timestep records to a Parquet file.
///
/// Correlation columns are emitted for as many lags as the first record
/// holds; all records of a run share that count.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if the configuration is invalid, or
/// [`IoError::Parquet`] if batch conversion or file I/O fails.
pub fn write_stats(
    path: &Path,
    records: &[TimestepRecord],
    config: &WriterConfig,
) -> Result<(), IoError> {
    config.validate()?;

    let max_lag = records
        .first()
        .map_or(1, |r| r.correlation.max_lag().max(1));
    let schema = parquet_write::build_schema(max_lag);
    let batch = parquet_write::records_to_batch(records, &schema, max_lag)?;
    parquet_write::write_batches(path, &[batch], &schema, config.properties()?)?;

    debug!(path = %path.display(), rows = records.len(), "statistics written");
    Ok(())
}

/// [`BatchSink`] writing each day to `<dir>/stats_<YYYYMMDD>.parquet`.
#[derive(Debug, Clone)]
pub struct ParquetSink {
    dir: PathBuf,
    config: WriterConfig,
    written: Vec<PathBuf>,
}

impl ParquetSink {
    /// Write into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] for an invalid configuration and
    /// [`IoError::Io`] if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>, config: WriterConfig) -> Result<Self, IoError> {
        config.validate()?;
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| IoError::io(&dir, e))?;
        Ok(Self {
            dir,
            config,
            written: Vec::new(),
        })
    }

    /// File for `day`.
    pub fn path_for(&self, day: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("stats_{}.parquet", day.format("%Y%m%d")))
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl BatchSink for ParquetSink {
    fn write_batch(&mut self, day: NaiveDate, records: &[TimestepRecord]) -> Result<(), IoError> {
        let path = self.path_for(day);
        write_stats(&path, records, &self.config)?;
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = WriterConfig::default();
        assert_eq!(config.compression, Compression::Snappy);
        assert_eq!(config.row_group_size, 100_000);
    }

    #[test]
    fn builder_methods() {
        let config = WriterConfig::default()
            .with_compression(Compression::Zstd)
            .with_row_group_size(500);
        assert_eq!(config.compression(), Compression::Zstd);
        assert_eq!(config.row_group_size, 500);
        assert!(config.properties().is_ok());
    }

    #[test]
    fn validate_zero_row_group_size() {
        let config = WriterConfig::default().with_row_group_size(0);
        let err = config.validate().unwrap_err();
        match err {
            IoError::Validation { count, details } => {
                assert_eq!(count, 1);
                assert!(details.contains("row_group_size"));
            }
            _ => panic!("expected Validation error"),
        }
    }

    #[test]
    fn daily_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ParquetSink::new(dir.path().join("out"), WriterConfig::default()).unwrap();
        let day = NaiveDate::from_ymd_opt(2021, 7, 3).unwrap();
        assert_eq!(
            sink.path_for(day),
            dir.path().join("out").join("stats_20210703.parquet")
        );
        assert!(dir.path().join("out").is_dir());
    }
}
