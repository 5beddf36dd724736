//! # nimbus-io
//!
//! File-side collaborators of the analysis engine: reading rainfall fields
//! from an archive of ESRI ASCII grids, exporting flow fields, and
//! persisting timestep statistics as one Parquet file per day.
//!
//! ## Data Flow
//!
//! ```mermaid
//! graph LR
//!     A["<prefix>YYYYMMDDHHMM.asc"] -->|"GridArchive::inputs()"| B["FieldInput"]
//!     B --> C["RunController"]
//!     C -->|"TimestepRecord"| D["DailyBatcher"]
//!     D -->|"BatchSink"| E["stats_YYYYMMDD.parquet"]
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use nimbus_io::{ArchiveConfig, DailyBatcher, GridArchive, ParquetSink, RecordSink, WriterConfig};
//!
//! let archive = GridArchive::new(ArchiveConfig::new("data/").with_prefix("AQC"))?;
//! let mut sink = DailyBatcher::new(ParquetSink::new("out/", WriterConfig::default())?);
//! for record in controller.records(archive.inputs(start, end)) {
//!     sink.push(record?)?;
//! }
//! sink.finish()?;
//! ```

mod archive;
mod ascii_grid;
mod error;
mod export;
mod parquet_read;
mod parquet_write;
mod sink;
mod writer;

pub use archive::{ArchiveConfig, GridArchive};
pub use ascii_grid::{
    AsciiGrid, DEFAULT_NODATA, extract_middle_domain, format_ascii_grid, parse_ascii_grid,
    read_ascii_grid, write_ascii_grid,
};
pub use error::IoError;
pub use export::write_flow;
pub use parquet_read::{read_stats, read_stats_column};
pub use sink::{BatchSink, DailyBatcher, MIN_DAILY_RECORDS, RecordSink, daily_correlation_means};
pub use writer::{Compression, ParquetSink, WriterConfig, write_stats};
