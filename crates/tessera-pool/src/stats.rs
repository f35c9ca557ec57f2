//! Pool statistics.
//!
//! Counters are monotonic and updated with relaxed atomics; a
//! [`PoolStats`] value is a point-in-time reading, not a consistent
//! snapshot across buckets while other threads are active.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time statistics for one pool (or the sum over a pool set).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Blocks allocated fresh because no free block of the length existed.
    pub allocated: u64,
    /// Requests satisfied by popping a free block.
    pub reused: u64,
    /// Releases that pushed a block back onto its free list.
    pub recycled: u64,
    /// Blocks freed, either released while pooling was disabled or
    /// dropped by a flush.
    pub freed: u64,
    /// Blocks currently sitting in free lists.
    pub free_blocks: usize,
    /// Element storage held by those free blocks, in bytes.
    pub free_bytes: usize,
}

impl PoolStats {
    /// Blocks allocated by the pool that are neither free nor freed, i.e.
    /// currently held by at least one array.
    pub fn outstanding(&self) -> u64 {
        self.allocated
            .saturating_sub(self.freed)
            .saturating_sub(self.free_blocks as u64)
    }

    /// Fraction of requests served from a free list, in `[0, 1]`.
    ///
    /// Returns 0.0 before the first request.
    pub fn reuse_ratio(&self) -> f64 {
        let requests = self.allocated + self.reused;
        if requests == 0 {
            0.0
        } else {
            self.reused as f64 / requests as f64
        }
    }

    /// Field-wise sum, for aggregating over element types.
    #[must_use]
    pub fn merge(self, other: PoolStats) -> PoolStats {
        PoolStats {
            allocated: self.allocated + other.allocated,
            reused: self.reused + other.reused,
            recycled: self.recycled + other.recycled,
            freed: self.freed + other.freed,
            free_blocks: self.free_blocks + other.free_blocks,
            free_bytes: self.free_bytes + other.free_bytes,
        }
    }
}

/// Live counters shared by a pool and its buckets.
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    allocated: AtomicU64,
    reused: AtomicU64,
    recycled: AtomicU64,
    freed: AtomicU64,
}

impl PoolCounters {
    pub(crate) fn record_allocated(&self, n: u64) {
        self.allocated.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn record_reused(&self) {
        self.reused.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_recycled(&self) {
        self.recycled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_freed(&self, n: u64) {
        self.freed.fetch_add(n, Ordering::Relaxed);
    }

    /// Read the counters into a stats value. Free-list fields are left at
    /// zero for the caller to fill in.
    pub(crate) fn read(&self) -> PoolStats {
        PoolStats {
            allocated: self.allocated.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            recycled: self.recycled.load(Ordering::Relaxed),
            freed: self.freed.load(Ordering::Relaxed),
            free_blocks: 0,
            free_bytes: 0,
        }
    }
}
