//! Tessera: pooled, copy-on-write numeric arrays for simulation timestep
//! loops.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Tessera sub-crates. For most users, adding `tessera` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tessera::prelude::*;
//!
//! // One pool set per application, created at the composition root.
//! let pools = PoolSet::new();
//! let reals = pools.pool::<f64>();
//!
//! for _step in 0..10 {
//!     // After the first step these come from the pool, not the allocator.
//!     let mut work = reals.filled(1024, 0.0);
//!     work[0] = 1.0;
//!
//!     let mut shared = work.clone();
//!     shared.ensure_unique();
//!     shared[0] = 2.0;
//!     assert_eq!(work[0], 1.0);
//! }
//! assert_eq!(pools.stats().allocated, 2);
//!
//! // At shutdown: free everything and stop recycling.
//! pools.cleanup();
//! assert!(!pools.pooling_enabled());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`pool`] | `tessera-pool` | `Array`, `ArrayPool`, `PoolSet`, config and stats |
//! | [`types`] | `tessera-core` | `Element`, pooling lifecycle, `ArrayError` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Pooled arrays, per-type pools and the pool set (`tessera-pool`).
pub use tessera_pool as pool;

/// Element bound, pooling lifecycle and error types (`tessera-core`).
pub use tessera_core as types;

/// Common imports for typical Tessera usage.
///
/// ```rust
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    // Arrays and pools
    pub use tessera_pool::{copy, swap, Array, ArrayPool, PoolConfig, PoolSet, PoolStats};

    // Core types
    pub use tessera_core::{ArrayError, Element, PoolingState};
}
