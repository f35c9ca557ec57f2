//! Per-element-type array pools.
//!
//! An [`ArrayPool<T>`] maps array lengths to [`Bucket`]s. The map itself is
//! behind a read-mostly `RwLock`: after the first request for a length, a
//! lookup is a shared read and all contention moves to that length's bucket.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tessera_core::{ArrayError, Element, PoolingLatch, PoolingState};

use crate::array::Array;
use crate::bucket::Bucket;
use crate::config::PoolConfig;
use crate::stats::{PoolCounters, PoolStats};

/// Recycling cache of backing blocks for one element type.
///
/// Usually obtained from [`PoolSet::pool`](crate::PoolSet::pool), which
/// shares one pooling latch between all element types. A standalone pool
/// built with [`ArrayPool::new`] owns its own latch.
///
/// Pools are always handled through `Arc`; arrays hold only weak links
/// back to their bucket, so dropping the last `Arc<ArrayPool<T>>` frees
/// every spare block and turns later releases into plain frees.
pub struct ArrayPool<T> {
    buckets: RwLock<IndexMap<usize, Arc<Bucket<T>>>>,
    latch: Arc<PoolingLatch>,
    counters: Arc<PoolCounters>,
    config: PoolConfig,
    owns_latch: bool,
}

impl<T: Element> ArrayPool<T> {
    /// Create a standalone pool with default configuration.
    pub fn new() -> Arc<Self> {
        let config = PoolConfig::new();
        let latch = Arc::new(PoolingLatch::new(config.initial_state()));
        Arc::new(Self::with_latch(config, latch, true))
    }

    /// Create a standalone pool with the given configuration.
    pub fn with_config(config: PoolConfig) -> Result<Arc<Self>, ArrayError> {
        config.validate()?;
        let latch = Arc::new(PoolingLatch::new(config.initial_state()));
        Ok(Arc::new(Self::with_latch(config, latch, true)))
    }

    /// Create a pool around `latch`. `owns_latch` is false when the latch
    /// is shared with the other pools of a [`PoolSet`](crate::PoolSet).
    pub(crate) fn with_latch(
        config: PoolConfig,
        latch: Arc<PoolingLatch>,
        owns_latch: bool,
    ) -> Self {
        Self {
            buckets: RwLock::new(IndexMap::new()),
            latch,
            counters: Arc::new(PoolCounters::default()),
            config,
            owns_latch,
        }
    }

    /// Bucket for `len`, created on first use.
    fn bucket(&self, len: usize) -> Arc<Bucket<T>> {
        if let Some(bucket) = self.buckets.read().get(&len) {
            return Arc::clone(bucket);
        }
        let mut buckets = self.buckets.write();
        let bucket = buckets.entry(len).or_insert_with(|| {
            Arc::new(Bucket::new(
                len,
                self.config.bucket_capacity,
                Arc::clone(&self.latch),
                Arc::clone(&self.counters),
            ))
        });
        Arc::clone(bucket)
    }

    /// Create an array of `len` elements.
    ///
    /// The storage is a recycled block when one of this length is free,
    /// otherwise a fresh default-filled allocation. Contents of a recycled
    /// block are whatever its previous user left there; use
    /// [`filled`](Self::filled) when the initial values matter.
    ///
    /// `len == 0` returns an empty array without touching the pool.
    pub fn array(&self, len: usize) -> Array<T> {
        if len == 0 {
            return Array::new();
        }
        Array::from_block(self.bucket(len).take())
    }

    /// Create an array of `len` copies of `value`.
    pub fn filled(&self, len: usize, value: T) -> Array<T> {
        let mut array = self.array(len);
        array.as_mut_slice().fill(value);
        array
    }

    /// Create an array holding a copy of `values`.
    pub fn from_slice(&self, values: &[T]) -> Array<T> {
        let mut array = self.array(values.len());
        array.as_mut_slice().clone_from_slice(values);
        array
    }

    /// Pre-allocate `count` spare blocks of length `len`.
    ///
    /// Returns the number of blocks added, which is zero for `len == 0` or
    /// while pooling is disabled.
    pub fn reserve(&self, len: usize, count: usize) -> Result<usize, ArrayError> {
        if count > self.config.max_prewarm {
            return Err(ArrayError::PrewarmLimit {
                requested: count,
                limit: self.config.max_prewarm,
            });
        }
        if len == 0 || count == 0 {
            return Ok(0);
        }
        Ok(self.bucket(len).prewarm(count))
    }
}

impl<T> ArrayPool<T> {
    /// Free every spare block of every length.
    ///
    /// Blocks held by live arrays are unaffected and return to the pool
    /// normally when released. Returns the number of blocks freed.
    pub fn flush(&self) -> usize {
        let buckets: Vec<Arc<Bucket<T>>> = self.buckets.read().values().cloned().collect();
        buckets.iter().map(|b| b.flush()).sum()
    }

    /// Number of spare blocks of length `len`.
    pub fn free_count(&self, len: usize) -> usize {
        self.buckets
            .read()
            .get(&len)
            .map_or(0, |bucket| bucket.free_count())
    }

    /// Number of spare blocks across all lengths.
    pub fn total_free(&self) -> usize {
        self.buckets.read().values().map(|b| b.free_count()).sum()
    }

    /// Element storage held by spare blocks, in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.buckets.read().values().map(|b| b.free_bytes()).sum()
    }

    /// Lengths that have been requested at least once, in first-use order.
    pub fn lengths(&self) -> Vec<usize> {
        self.buckets.read().values().map(|b| b.len()).collect()
    }

    /// Current statistics.
    pub fn stats(&self) -> PoolStats {
        let mut stats = self.counters.read();
        let buckets = self.buckets.read();
        for bucket in buckets.values() {
            stats.free_blocks += bucket.free_count();
            stats.free_bytes += bucket.free_bytes();
        }
        stats
    }

    /// Current pooling state. Shared with every pool of the same set.
    pub fn pooling_state(&self) -> PoolingState {
        self.latch.state()
    }

    /// Whether released blocks are currently recycled.
    pub fn pooling_enabled(&self) -> bool {
        self.latch.is_enabled()
    }

    /// `false` disables pooling for good; `true` only queries.
    ///
    /// The latch is shared: disabling through one pool of a
    /// [`PoolSet`](crate::PoolSet) disables all of them. Returns whether
    /// pooling is enabled after the call.
    pub fn set_pooling_enabled(&self, enabled: bool) -> bool {
        self.latch.request(enabled) == PoolingState::Enabled
    }

    /// Disable pooling, then free every spare block.
    ///
    /// Disabling first means no release can slip a block into a free list
    /// after it has been flushed. Returns the number of blocks freed.
    ///
    /// Only a standalone pool owns its latch. A pool belonging to a
    /// [`PoolSet`](crate::PoolSet) shares the latch with every other element
    /// type, so here cleanup is a plain [`flush`](Self::flush) and the latch
    /// is left alone; use [`PoolSet::cleanup`](crate::PoolSet::cleanup) to
    /// shut the whole set down.
    pub fn cleanup(&self) -> usize {
        if self.owns_latch {
            self.latch.disable();
        }
        self.flush()
    }
}
