//! Run controller states.

use serde::Serialize;

/// History state of the run controller.
///
/// The state follows the number of consecutive wet fields held: a dry or
/// unreadable field always returns the controller to [`RunState::Cold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// No valid history.
    Cold,
    /// One valid field; spectral statistics only.
    Warming,
    /// Two or more valid fields; motion, advection and correlation active.
    Tracking,
}

impl RunState {
    /// State implied by `len` consecutive wet fields.
    pub fn from_history(len: usize) -> Self {
        match len {
            0 => Self::Cold,
            1 => Self::Warming,
            _ => Self::Tracking,
        }
    }

    /// Lowercase name, as written to output files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Warming => "warming",
            Self::Tracking => "tracking",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
