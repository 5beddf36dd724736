//! Bounded FIFO of recent motion-sample batches.

use std::collections::VecDeque;

use crate::error::MotionError;
use crate::sample::MotionSample;

/// The last W accepted batches of motion samples, oldest evicted first.
#[derive(Debug, Clone)]
pub struct MotionWindow {
    batches: VecDeque<Vec<MotionSample>>,
    capacity: usize,
}

impl MotionWindow {
    /// Create an empty window holding at most `capacity` batches.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::InvalidConfig`] if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, MotionError> {
        if capacity == 0 {
            return Err(MotionError::InvalidConfig {
                reason: "motion window capacity must be at least 1".to_string(),
            });
        }
        Ok(Self {
            batches: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append a batch, evicting the oldest one when full.
    pub fn push(&mut self, batch: Vec<MotionSample>) {
        if self.batches.len() == self.capacity {
            self.batches.pop_front();
        }
        self.batches.push_back(batch);
    }

    /// All samples in the window, oldest batch first.
    pub fn pooled(&self) -> Vec<MotionSample> {
        self.batches.iter().flatten().copied().collect()
    }

    /// Drop all batches.
    pub fn clear(&mut self) {
        self.batches.clear();
    }

    /// Number of batches held.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// True when no batch is held.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Maximum number of batches.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(tag: f64, n: usize) -> Vec<MotionSample> {
        vec![MotionSample::new(tag, 0.0, 0.0, 0.0); n]
    }

    #[test]
    fn evicts_oldest() {
        let mut w = MotionWindow::new(3).unwrap();
        for i in 0..5 {
            w.push(batch(i as f64, 2));
            assert!(w.len() <= 3);
        }
        let pooled = w.pooled();
        assert_eq!(pooled.len(), 6);
        assert_eq!(pooled[0].x, 2.0);
        assert_eq!(pooled[5].x, 4.0);
    }

    #[test]
    fn clear_empties() {
        let mut w = MotionWindow::new(2).unwrap();
        w.push(batch(1.0, 4));
        w.clear();
        assert!(w.is_empty());
        assert!(w.pooled().is_empty());
    }

    #[test]
    fn zero_capacity_rejected() {
        assert!(MotionWindow::new(0).is_err());
    }
}
