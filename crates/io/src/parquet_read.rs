//! Reading statistics files back.

use std::path::Path;

use arrow::array::{Array, AsArray, RecordBatch};
use arrow::datatypes::Float64Type;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::IoError;

/// Leading columns every statistics file starts with.
const LEADING_COLUMNS: [&str; 3] = ["timestamp", "state", "motion_status"];

/// Reads all record batches from a statistics file.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist,
/// [`IoError::Parquet`] if it cannot be decoded and [`IoError::Validation`]
/// if its leading columns are not those of a statistics file.
pub fn read_stats(path: &Path) -> Result<Vec<RecordBatch>, IoError> {
    let file = std::fs::File::open(path).map_err(|e| IoError::io(path, e))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;

    if let Some(batch) = batches.first() {
        let schema = batch.schema();
        let mismatches: Vec<String> = LEADING_COLUMNS
            .iter()
            .enumerate()
            .filter_map(|(i, expected)| {
                let actual = schema.fields().get(i).map(|f| f.name().as_str());
                (actual != Some(*expected))
                    .then(|| format!("column {i}: expected '{expected}', got {actual:?}"))
            })
            .collect();
        if !mismatches.is_empty() {
            return Err(IoError::Validation {
                count: mismatches.len(),
                details: mismatches.join("; "),
            });
        }
    }
    Ok(batches)
}

/// One Float64 column of a statistics file, nulls as `None`.
///
/// # Errors
///
/// Returns the errors of [`read_stats`], and [`IoError::Validation`] if the
/// column is absent or not Float64.
pub fn read_stats_column(path: &Path, name: &str) -> Result<Vec<Option<f64>>, IoError> {
    let mut out = Vec::new();
    for batch in read_stats(path)? {
        let col = batch.column_by_name(name).ok_or_else(|| IoError::Validation {
            count: 1,
            details: format!("column '{name}' not found"),
        })?;
        let values = col
            .as_primitive_opt::<Float64Type>()
            .ok_or_else(|| IoError::Validation {
                count: 1,
                details: format!("column '{name}' is {}, not Float64", col.data_type()),
            })?;
        out.extend(values.iter());
    }
    Ok(out)
}
