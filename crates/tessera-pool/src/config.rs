//! Pool configuration parameters.

use tessera_core::{ArrayError, PoolingState};

/// Configuration for a pool set or a standalone array pool.
///
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Initial state of the pooling latch.
    ///
    /// Default: `true`. Starting with `false` gives plain allocate/free
    /// behaviour with the same API, which is useful under leak checkers.
    pub pooling_enabled: bool,

    /// Capacity reserved for each new per-length free list.
    ///
    /// Default: 4. Must be at least 1.
    pub bucket_capacity: usize,

    /// Largest block count accepted by a single pre-warm request.
    ///
    /// Default: 1024. Must be at least 1.
    pub max_prewarm: usize,
}

impl PoolConfig {
    /// Default per-length free list capacity.
    pub const DEFAULT_BUCKET_CAPACITY: usize = 4;

    /// Default pre-warm limit.
    pub const DEFAULT_MAX_PREWARM: usize = 1024;

    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            pooling_enabled: true,
            bucket_capacity: Self::DEFAULT_BUCKET_CAPACITY,
            max_prewarm: Self::DEFAULT_MAX_PREWARM,
        }
    }

    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<(), ArrayError> {
        if self.bucket_capacity == 0 {
            return Err(ArrayError::InvalidConfig {
                reason: "bucket_capacity must be >= 1 (got 0)".into(),
            });
        }
        if self.max_prewarm == 0 {
            return Err(ArrayError::InvalidConfig {
                reason: "max_prewarm must be >= 1 (got 0)".into(),
            });
        }
        Ok(())
    }

    /// Initial latch state implied by `pooling_enabled`.
    pub fn initial_state(&self) -> PoolingState {
        if self.pooling_enabled {
            PoolingState::Enabled
        } else {
            PoolingState::Disabled
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new()
    }
}
