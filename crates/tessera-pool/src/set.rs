//! The application-owned set of array pools.
//!
//! A [`PoolSet`] replaces a process-wide hidden store: the application
//! creates one at its composition root, hands it (or the per-type pools it
//! produces) to the code that needs arrays, and calls
//! [`PoolSet::cleanup`] once at shutdown.
//!
//! There is one [`ArrayPool<T>`] per element type `T`, created on first
//! request. All of them share a single [`PoolingLatch`], so disabling
//! pooling is a set-wide, one-way transition.

use std::any::{Any, TypeId};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tessera_core::{ArrayError, Element, PoolingLatch, PoolingState};

use crate::array::Array;
use crate::config::PoolConfig;
use crate::registry::ArrayPool;
use crate::stats::PoolStats;

/// Operations a pool set performs on pools without knowing their type.
trait ErasedPool: Send + Sync {
    fn flush(&self) -> usize;
    fn stats(&self) -> PoolStats;
    fn element_type(&self) -> &'static str;
}

impl<T: Element> ErasedPool for ArrayPool<T> {
    fn flush(&self) -> usize {
        ArrayPool::flush(self)
    }

    fn stats(&self) -> PoolStats {
        ArrayPool::stats(self)
    }

    fn element_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// One registered pool, viewed both typed (for downcasting) and erased
/// (for set-wide operations).
struct PoolEntry {
    typed: Arc<dyn Any + Send + Sync>,
    erased: Arc<dyn ErasedPool>,
}

/// The set of per-element-type array pools owned by an application.
pub struct PoolSet {
    latch: Arc<PoolingLatch>,
    config: PoolConfig,
    pools: RwLock<IndexMap<TypeId, PoolEntry>>,
}

impl PoolSet {
    /// Create a pool set with default configuration.
    pub fn new() -> Self {
        let config = PoolConfig::new();
        Self {
            latch: Arc::new(PoolingLatch::new(config.initial_state())),
            config,
            pools: RwLock::new(IndexMap::new()),
        }
    }

    /// Create a pool set with the given configuration.
    pub fn with_config(config: PoolConfig) -> Result<Self, ArrayError> {
        config.validate()?;
        Ok(Self {
            latch: Arc::new(PoolingLatch::new(config.initial_state())),
            config,
            pools: RwLock::new(IndexMap::new()),
        })
    }

    /// The pool for element type `T`. Every call for the same `T` returns
    /// the same pool.
    pub fn pool<T: Element>(&self) -> Arc<ArrayPool<T>> {
        let key = TypeId::of::<T>();
        if let Some(entry) = self.pools.read().get(&key) {
            return downcast(entry);
        }
        let mut pools = self.pools.write();
        let entry = pools.entry(key).or_insert_with(|| {
            tracing::debug!(element = std::any::type_name::<T>(), "registering array pool");
            let pool = Arc::new(ArrayPool::<T>::with_latch(
                self.config.clone(),
                Arc::clone(&self.latch),
                false,
            ));
            PoolEntry {
                typed: Arc::clone(&pool) as Arc<dyn Any + Send + Sync>,
                erased: pool,
            }
        });
        downcast(entry)
    }

    /// Shorthand for `self.pool::<T>().array(len)`.
    pub fn array<T: Element>(&self, len: usize) -> Array<T> {
        self.pool::<T>().array(len)
    }

    /// Current pooling state.
    pub fn pooling_state(&self) -> PoolingState {
        self.latch.state()
    }

    /// Whether released blocks are currently recycled.
    pub fn pooling_enabled(&self) -> bool {
        self.latch.is_enabled()
    }

    /// `false` disables pooling for every element type, permanently.
    /// `true` only queries: a disabled set stays disabled.
    ///
    /// Returns whether pooling is enabled after the call.
    pub fn set_pooling_enabled(&self, enabled: bool) -> bool {
        self.latch.request(enabled) == PoolingState::Enabled
    }

    /// Free every spare block in every pool. Returns the number freed.
    pub fn flush(&self) -> usize {
        self.erased_pools().iter().map(|p| p.flush()).sum()
    }

    /// Disable pooling, then free every spare block in every pool.
    ///
    /// Intended to be called once at shutdown. Blocks still held by arrays
    /// are freed when those arrays are released. Returns the number of
    /// spare blocks freed.
    pub fn cleanup(&self) -> usize {
        self.latch.disable();
        let freed = self.flush();
        tracing::info!(freed, pools = self.pool_count(), "array pools cleaned up");
        freed
    }

    /// Statistics summed over all element types.
    pub fn stats(&self) -> PoolStats {
        self.erased_pools()
            .iter()
            .map(|p| p.stats())
            .fold(PoolStats::default(), PoolStats::merge)
    }

    /// Per-element-type statistics, keyed by type name, in registration
    /// order.
    pub fn stats_by_type(&self) -> Vec<(&'static str, PoolStats)> {
        self.erased_pools()
            .iter()
            .map(|p| (p.element_type(), p.stats()))
            .collect()
    }

    /// Number of element types with a pool.
    pub fn pool_count(&self) -> usize {
        self.pools.read().len()
    }

    fn erased_pools(&self) -> Vec<Arc<dyn ErasedPool>> {
        self.pools
            .read()
            .values()
            .map(|e| Arc::clone(&e.erased))
            .collect()
    }
}

impl Default for PoolSet {
    fn default() -> Self {
        Self::new()
    }
}

fn downcast<T: Element>(entry: &PoolEntry) -> Arc<ArrayPool<T>> {
    Arc::clone(&entry.typed)
        .downcast::<ArrayPool<T>>()
        .expect("pool entries are keyed by the TypeId of their element type")
}
