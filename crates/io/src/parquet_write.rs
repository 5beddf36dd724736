//! Low-level Parquet column building for timestep records.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, Float64Array, RecordBatch, StringArray, TimestampSecondArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use nimbus_engine::{SpectralRecord, TimestepRecord};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

use crate::error::IoError;

/// Nullable scalar columns, in schema order after `timestamp` and `state`.
const SCALAR_COLUMNS: [&str; 24] = [
    "war",
    "rain_mean",
    "rain_std",
    "rain_cond_mean",
    "rain_cond_std",
    "dbz_mean",
    "dbz_std",
    "dbz_cond_mean",
    "dbz_cond_std",
    "scale_break",
    "beta1",
    "intercept1",
    "r_beta1",
    "beta2",
    "intercept2",
    "r_beta2",
    "eccentricity",
    "orientation",
    "speed_upper",
    "median_speed",
    "bandwidth",
    "mean_u",
    "mean_v",
    "n_declustered",
];

/// Builds the Arrow schema for timestep statistics.
///
/// Columns: `timestamp`, `state`, `motion_status`, the scalar statistics,
/// then `eulerian_lag{k}` and `lagrangian_lag{k}` for `k = 1..=max_lag`.
/// Undefined statistics are nulls.
pub(crate) fn build_schema(max_lag: usize) -> Schema {
    let mut fields = vec![
        Field::new(
            "timestamp",
            DataType::Timestamp(TimeUnit::Second, None),
            false,
        ),
        Field::new("state", DataType::Utf8, false),
        Field::new("motion_status", DataType::Utf8, false),
    ];
    for name in SCALAR_COLUMNS {
        let dt = if name == "n_declustered" {
            DataType::UInt32
        } else {
            DataType::Float64
        };
        fields.push(Field::new(name, dt, name != "war" && name != "n_declustered"));
    }
    for k in 1..=max_lag {
        fields.push(Field::new(format!("eulerian_lag{k}"), DataType::Float64, true));
        fields.push(Field::new(format!("lagrangian_lag{k}"), DataType::Float64, true));
    }
    Schema::new(fields)
}

fn float_col(records: &[TimestepRecord], f: impl Fn(&TimestepRecord) -> Option<f64>) -> ArrayRef {
    Arc::new(Float64Array::from(records.iter().map(f).collect::<Vec<_>>()))
}

fn spectral_col(records: &[TimestepRecord], f: impl Fn(&SpectralRecord) -> Option<f64>) -> ArrayRef {
    float_col(records, |r| r.spectral.as_ref().and_then(&f))
}

/// Converts records into one Arrow [`RecordBatch`] matching `schema`.
///
/// The schema must come from [`build_schema`] with the records' lag count.
pub(crate) fn records_to_batch(
    records: &[TimestepRecord],
    schema: &Schema,
    max_lag: usize,
) -> Result<RecordBatch, IoError> {
    let timestamps: Vec<i64> = records
        .iter()
        .map(|r| r.timestamp.and_utc().timestamp())
        .collect();

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(TimestampSecondArray::from(timestamps)),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.state.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.motion.status.as_str()),
        )),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.war))),
        float_col(records, |r| r.rain.mean),
        float_col(records, |r| r.rain.std),
        float_col(records, |r| r.rain.cond_mean),
        float_col(records, |r| r.rain.cond_std),
        float_col(records, |r| r.dbz.mean),
        float_col(records, |r| r.dbz.std),
        float_col(records, |r| r.dbz.cond_mean),
        float_col(records, |r| r.dbz.cond_std),
        spectral_col(records, |s| s.scale_break),
        spectral_col(records, |s| s.beta1),
        spectral_col(records, |s| s.intercept1),
        spectral_col(records, |s| s.r_beta1),
        spectral_col(records, |s| s.beta2),
        spectral_col(records, |s| s.intercept2),
        spectral_col(records, |s| s.r_beta2),
        spectral_col(records, |s| s.eccentricity),
        spectral_col(records, |s| s.orientation),
        float_col(records, |r| r.motion.speed_upper),
        float_col(records, |r| r.motion.median_speed),
        float_col(records, |r| r.motion.bandwidth),
        float_col(records, |r| r.motion.mean_u),
        float_col(records, |r| r.motion.mean_v),
        Arc::new(UInt32Array::from_iter_values(
            records.iter().map(|r| r.motion.n_declustered as u32),
        )),
    ];
    for k in 1..=max_lag {
        columns.push(float_col(records, |r| r.correlation.eulerian_at(k)));
        columns.push(float_col(records, |r| r.correlation.lagrangian_at(k)));
    }

    Ok(RecordBatch::try_new(Arc::new(schema.clone()), columns)?)
}

/// Writes a sequence of [`RecordBatch`]es to a Parquet file at `path`.
///
/// # Errors
///
/// Returns [`IoError::Io`] if the file cannot be created and
/// [`IoError::Parquet`] if batch writing or file finalisation fails.
pub(crate) fn write_batches(
    path: &Path,
    batches: &[RecordBatch],
    schema: &Schema,
    props: WriterProperties,
) -> Result<(), IoError> {
    let file = std::fs::File::create(path).map_err(|e| IoError::io(path, e))?;
    let mut writer = ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(props))?;

    for batch in batches {
        writer.write(batch)?;
    }

    writer.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_columns() {
        let schema = build_schema(2);
        assert_eq!(schema.fields().len(), 3 + SCALAR_COLUMNS.len() + 4);
        assert_eq!(schema.field(0).name(), "timestamp");
        assert_eq!(schema.field(1).name(), "state");
        assert_eq!(schema.field(3).name(), "war");
        assert!(!schema.field(3).is_nullable());
        assert!(schema.field(4).is_nullable());
        let last = schema.fields().len() - 1;
        assert_eq!(schema.field(last).name(), "lagrangian_lag2");
    }

    #[test]
    fn empty_batch() {
        let schema = build_schema(1);
        let batch = records_to_batch(&[], &schema, 1).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), schema.fields().len());
    }
}
