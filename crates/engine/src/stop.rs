//! Cooperative cancellation between timesteps.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag asking a run to halt after the current timestep.
///
/// Clones share the flag, so a handle can be moved to a signal handler or
/// another thread while the controller keeps its own copy.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    /// A handle with no stop requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to halt before the next timestep.
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clear a pending request so the run can resume.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
