//! Error types for checked array access and pool configuration.
//!
//! Unchecked element access never produces these: an out-of-range index on
//! the unchecked path is a caller bug, not an error value. Allocation
//! failure is not represented either; it aborts through the global
//! allocator.

use std::error::Error;
use std::fmt;

/// Errors returned by the checked access paths of a pooled array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayError {
    /// Index past the end of the array.
    OutOfBounds {
        /// The requested index.
        index: usize,
        /// Length of the array.
        len: usize,
    },
    /// The array holds no backing block.
    Empty,
    /// Mutable access was requested while the backing block is shared with
    /// other arrays. Call `ensure_unique()` first.
    Shared {
        /// Number of arrays sharing the block at the time of the check.
        refs: usize,
    },
    /// A pre-warm request asked for more blocks than the pool allows.
    PrewarmLimit {
        /// Number of blocks requested.
        requested: usize,
        /// Configured `max_prewarm`.
        limit: usize,
    },
    /// A pool configuration value was rejected.
    InvalidConfig {
        /// Why the configuration is invalid.
        reason: String,
    },
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for array of length {len}")
            }
            Self::Empty => write!(f, "array is empty"),
            Self::Shared { refs } => {
                write!(
                    f,
                    "array storage is shared by {refs} handles; call ensure_unique() before mutating"
                )
            }
            Self::PrewarmLimit { requested, limit } => {
                write!(f, "cannot pre-warm {requested} blocks, limit is {limit}")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid pool config: {reason}"),
        }
    }
}

impl Error for ArrayError {}
