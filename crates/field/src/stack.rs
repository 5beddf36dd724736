//! Fixed-capacity, most-recent-first buffer of accepted fields.

use std::collections::VecDeque;

use ndarray::Array2;
use tracing::trace;

use crate::error::FieldError;

/// The K most recently accepted fields, newest at index 0.
///
/// All fields in a stack share one square shape; the shape is fixed by
/// the first field pushed after construction or after [`FieldStack::clear`].
#[derive(Debug, Clone)]
pub struct FieldStack {
    fields: VecDeque<Array2<f64>>,
    capacity: usize,
    shape: Option<(usize, usize)>,
}

impl FieldStack {
    /// Create an empty stack holding at most `capacity` fields.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::ZeroCapacity`] if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, FieldError> {
        if capacity == 0 {
            return Err(FieldError::ZeroCapacity);
        }
        Ok(Self {
            fields: VecDeque::with_capacity(capacity),
            capacity,
            shape: None,
        })
    }

    /// Check that `field` could be pushed without changing the stack.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::NotSquare`] for non-square fields and
    /// [`FieldError::ShapeMismatch`] when the shape differs from the fields
    /// already held.
    pub fn check(&self, field: &Array2<f64>) -> Result<(), FieldError> {
        let (rows, cols) = field.dim();
        if rows != cols {
            return Err(FieldError::NotSquare { rows, cols });
        }
        match self.shape {
            Some(expected) if expected != (rows, cols) => Err(FieldError::ShapeMismatch {
                expected,
                got: (rows, cols),
            }),
            _ => Ok(()),
        }
    }

    /// Insert `field` at the front, evicting the oldest field when full.
    ///
    /// Returns the evicted field, if any.
    ///
    /// # Errors
    ///
    /// Same as [`FieldStack::check`]; the stack is left unchanged.
    pub fn push(&mut self, field: Array2<f64>) -> Result<Option<Array2<f64>>, FieldError> {
        self.check(&field)?;
        self.shape = Some(field.dim());

        let evicted = if self.fields.len() == self.capacity {
            self.fields.pop_back()
        } else {
            None
        };
        self.fields.push_front(field);
        Ok(evicted)
    }

    /// Field `lag` steps back (0 = most recent).
    pub fn get(&self, lag: usize) -> Option<&Array2<f64>> {
        self.fields.get(lag)
    }

    /// Most recent field.
    pub fn latest(&self) -> Option<&Array2<f64>> {
        self.fields.front()
    }

    /// Discard all history. The shape is released as well.
    pub fn clear(&mut self) {
        if !self.fields.is_empty() {
            trace!(dropped = self.fields.len(), "field stack cleared");
        }
        self.fields.clear();
        self.shape = None;
    }

    /// Number of valid fields held.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if no valid field is held.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Maximum number of fields.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Shape shared by the stacked fields, if any.
    pub fn shape(&self) -> Option<(usize, usize)> {
        self.shape
    }

    /// Iterate from most recent to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &Array2<f64>> {
        self.fields.iter()
    }
}
