//! Record sinks and daily batching.

use chrono::NaiveDate;
use nimbus_engine::TimestepRecord;
use tracing::{debug, info};

use crate::error::IoError;

/// Minimum records a day needs before it is persisted.
pub const MIN_DAILY_RECORDS: usize = 2;

/// Consumer of timestep records, fed in time order.
pub trait RecordSink {
    /// Accept one record.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`] if persisting a completed batch fails.
    fn push(&mut self, record: TimestepRecord) -> Result<(), IoError>;

    /// Persist anything still buffered. Called once at the end of a run.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`] if persisting the final batch fails.
    fn finish(&mut self) -> Result<(), IoError>;
}

/// Destination for one calendar day of records.
pub trait BatchSink {
    /// Persist the records of `day`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`] if writing fails.
    fn write_batch(&mut self, day: NaiveDate, records: &[TimestepRecord]) -> Result<(), IoError>;
}

/// Mean of the defined values, `None` if there are none.
fn mean_defined(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, n) = values
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Daily mean lag-1 Eulerian and Lagrangian correlations.
pub fn daily_correlation_means(records: &[TimestepRecord]) -> (Option<f64>, Option<f64>) {
    (
        mean_defined(records.iter().map(|r| r.correlation.eulerian_at(1))),
        mean_defined(records.iter().map(|r| r.correlation.lagrangian_at(1))),
    )
}

/// Groups records by calendar day and hands each finished day to a
/// [`BatchSink`].
///
/// A day is complete when a record from a later day arrives or the run
/// finishes. Days with fewer than `min_records` records are dropped.
#[derive(Debug)]
pub struct DailyBatcher<S> {
    sink: S,
    min_records: usize,
    day: Option<NaiveDate>,
    pending: Vec<TimestepRecord>,
    days_written: usize,
    days_skipped: usize,
}

impl<S: BatchSink> DailyBatcher<S> {
    /// Batch into `sink` using [`MIN_DAILY_RECORDS`].
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            min_records: MIN_DAILY_RECORDS,
            day: None,
            pending: Vec::new(),
            days_written: 0,
            days_skipped: 0,
        }
    }

    /// Sets the minimum number of records for a day to be written.
    pub fn with_min_records(mut self, n: usize) -> Self {
        self.min_records = n;
        self
    }

    /// Days handed to the sink so far.
    pub fn days_written(&self) -> usize {
        self.days_written
    }

    /// Days dropped for having too few records.
    pub fn days_skipped(&self) -> usize {
        self.days_skipped
    }

    /// Records buffered for the current day.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// The wrapped sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the batcher, returning the wrapped sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn flush(&mut self) -> Result<(), IoError> {
        let Some(day) = self.day.take() else {
            return Ok(());
        };
        let records = std::mem::take(&mut self.pending);
        if records.len() < self.min_records {
            debug!(%day, records = records.len(), "too few records, day skipped");
            self.days_skipped += 1;
            return Ok(());
        }

        let (eul, lagr) = daily_correlation_means(&records);
        let difference = eul.zip(lagr).map(|(e, l)| l - e);
        info!(
            %day,
            records = records.len(),
            eulerian = ?eul,
            lagrangian = ?lagr,
            difference = ?difference,
            "daily summary"
        );
        self.sink.write_batch(day, &records)?;
        self.days_written += 1;
        Ok(())
    }
}

impl<S: BatchSink> RecordSink for DailyBatcher<S> {
    fn push(&mut self, record: TimestepRecord) -> Result<(), IoError> {
        let day = record.timestamp.date();
        if self.day.is_some_and(|d| d != day) {
            self.flush()?;
        }
        self.day = Some(day);
        self.pending.push(record);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), IoError> {
        self.flush()
    }
}
