//! Timestamped field input and the lazy record iterator.

use chrono::NaiveDateTime;
use ndarray::Array2;
use tracing::info;

use crate::controller::{RunController, StepOutcome};
use crate::error::EngineError;
use crate::record::TimestepRecord;

/// One element of the input stream.
///
/// `field` is `None` when the reader could not produce the field; the
/// controller treats that like a dry field but logs it separately.
#[derive(Debug, Clone)]
pub struct FieldInput {
    /// Nominal time of the field.
    pub timestamp: NaiveDateTime,
    /// Raw rain-rate field, if readable.
    pub field: Option<Array2<f64>>,
}

impl FieldInput {
    /// A readable field.
    pub fn valid(timestamp: NaiveDateTime, field: Array2<f64>) -> Self {
        Self {
            timestamp,
            field: Some(field),
        }
    }

    /// A field that could not be read.
    pub fn unreadable(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            field: None,
        }
    }

    /// Whether the field was readable.
    pub fn is_valid(&self) -> bool {
        self.field.is_some()
    }
}

/// Lazy sequence of records, one per wet timestep.
///
/// Pulls inputs only as records are requested and stops early once the
/// controller's [`StopHandle`](crate::StopHandle) is triggered. The
/// controller keeps its history when the iterator is dropped, so a new
/// iterator over later inputs continues the same run.
pub struct Records<'a, I> {
    controller: &'a mut RunController,
    inputs: I,
}

impl<'a, I> Records<'a, I>
where
    I: Iterator<Item = FieldInput>,
{
    pub(crate) fn new(controller: &'a mut RunController, inputs: I) -> Self {
        Self { controller, inputs }
    }
}

impl<I> Iterator for Records<'_, I>
where
    I: Iterator<Item = FieldInput>,
{
    type Item = Result<TimestepRecord, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.controller.stop_handle().is_stop_requested() {
                info!("stop requested, halting before next timestep");
                return None;
            }
            let input = self.inputs.next()?;
            match self.controller.step(input) {
                Ok(StepOutcome::Record(record)) => return Some(Ok(*record)),
                Ok(StepOutcome::Reset { .. }) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
