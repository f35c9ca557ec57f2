//! Per-length free lists.
//!
//! A [`Bucket`] holds the spare blocks of one element type and one length.
//! Every hand-out and every return of a block of that length goes through
//! the bucket's mutex, so a block is never handed out twice, never lost, and
//! never pushed twice.
//!
//! # Last-owner detection
//!
//! Dropping an `Arc` decrements the count outside of any lock, so two
//! arrays sharing a block and released on two threads could each see the
//! other still alive and both skip the free list. To rule that out, every
//! decrement of a pooled block happens inside [`Bucket::release`] with the
//! lock held: uniqueness is checked with `Arc::get_mut`, and a non-unique
//! `Arc` is dropped before the lock is released. The last of any set of
//! concurrent releases therefore always observes a count of one.

use std::sync::Arc;

use parking_lot::Mutex;
use tessera_core::{Element, PoolingLatch};

use crate::block::Block;
use crate::stats::PoolCounters;

/// Spare blocks of a single length.
pub(crate) struct Bucket<T> {
    len: usize,
    /// Blocks not referenced by any array. LIFO.
    free: Mutex<Vec<Arc<Block<T>>>>,
    latch: Arc<PoolingLatch>,
    counters: Arc<PoolCounters>,
}

impl<T: Element> Bucket<T> {
    pub(crate) fn new(
        len: usize,
        capacity: usize,
        latch: Arc<PoolingLatch>,
        counters: Arc<PoolCounters>,
    ) -> Self {
        Self {
            len,
            free: Mutex::new(Vec::with_capacity(capacity)),
            latch,
            counters,
        }
    }

    /// Hand out a block: the most recently released one if any, otherwise a
    /// freshly allocated one. The returned `Arc` is the only strong owner.
    pub(crate) fn take(self: &Arc<Self>) -> Arc<Block<T>> {
        let spare = self.free.lock().pop();
        match spare {
            Some(block) => {
                self.counters.record_reused();
                tracing::trace!(len = self.len, "reusing pooled block");
                block
            }
            None => {
                self.counters.record_allocated(1);
                tracing::debug!(len = self.len, "allocating block");
                Arc::new(Block::new(self.len, Arc::downgrade(self)))
            }
        }
    }

    /// Give up one array's share of `block`.
    ///
    /// If the caller held the last share, the block is pushed onto the free
    /// list while pooling is enabled, or freed otherwise.
    pub(crate) fn release(&self, mut block: Arc<Block<T>>) {
        debug_assert_eq!(block.len(), self.len);
        let mut free = self.free.lock();
        if Arc::get_mut(&mut block).is_none() {
            // Still shared: this drop is the decrement, under the lock.
            drop(block);
            return;
        }
        if self.latch.is_enabled() {
            free.push(block);
            self.counters.record_recycled();
            tracing::trace!(len = self.len, "block returned to pool");
            return;
        }
        drop(free);
        self.counters.record_freed(1);
        tracing::trace!(len = self.len, "block freed, pooling disabled");
        drop(block);
    }

    /// Push `count` freshly allocated blocks onto the free list.
    ///
    /// Does nothing while pooling is disabled. Returns the number of blocks
    /// added.
    pub(crate) fn prewarm(self: &Arc<Self>, count: usize) -> usize {
        if !self.latch.is_enabled() {
            return 0;
        }
        let fresh: Vec<Arc<Block<T>>> = (0..count)
            .map(|_| Arc::new(Block::new(self.len, Arc::downgrade(self))))
            .collect();
        self.counters.record_allocated(count as u64);

        let mut free = self.free.lock();
        if !self.latch.is_enabled() {
            // Disabled while allocating: nothing may enter the free list now.
            drop(free);
            self.counters.record_freed(count as u64);
            return 0;
        }
        free.extend(fresh);
        tracing::debug!(len = self.len, count, "pre-warmed bucket");
        count
    }
}

impl<T> Bucket<T> {
    /// Drop every spare block. Blocks held by arrays are unaffected.
    ///
    /// Returns the number of blocks freed.
    pub(crate) fn flush(&self) -> usize {
        let drained = std::mem::take(&mut *self.free.lock());
        let freed = drained.len();
        if freed > 0 {
            self.counters.record_freed(freed as u64);
            tracing::debug!(len = self.len, freed, "flushed bucket");
        }
        drop(drained);
        freed
    }

    /// Number of spare blocks.
    pub(crate) fn free_count(&self) -> usize {
        self.free.lock().len()
    }

    /// Element storage held by spare blocks, in bytes.
    pub(crate) fn free_bytes(&self) -> usize {
        self.free.lock().iter().map(|b| b.memory_bytes()).sum()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}
