//! Pooled, reference-counted, copy-on-write arrays for Tessera simulations.
//!
//! Timestep loops allocate the same temporary working arrays over and over.
//! This crate makes "create an N-element array, use it, drop it" cheap: the
//! backing storage of a dropped [`Array`] goes back to a free list keyed by
//! its length, and the next request for that length pops it instead of
//! touching the allocator.
//!
//! # Architecture
//!
//! ```text
//! PoolSet (composition root, one per application)
//! ├── PoolingLatch (Enabled → Disabled, shared by every pool)
//! └── ArrayPool<T> × element types
//!     └── Bucket<T> × lengths (free list behind its own mutex)
//!         └── Arc<Block<T>> (fixed-length RawBuffer + Weak back-link)
//!
//! Array<T> ──► Option<Arc<Block<T>>>
//! ```
//!
//! # Value semantics
//!
//! - `clone()` shares the block; no element is copied.
//! - Moving an `Array` (or [`Array::take`]) transfers the block.
//! - [`Array::ensure_unique`] is the copy-on-write promotion: it is never
//!   called implicitly, so callers that may hold a shared block call it
//!   before mutating.
//! - [`Array::swap`] exchanges blocks in O(1).
//!
//! # Safety
//!
//! The only `unsafe` code lives in `raw.rs` and in the two explicitly
//! unchecked accessors on [`Array`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod array;
mod block;
mod bucket;
pub mod config;
mod raw;
pub mod registry;
pub mod set;
pub mod stats;

// Public re-exports for the primary API surface.
pub use array::{copy, swap, Array};
pub use config::PoolConfig;
pub use registry::ArrayPool;
pub use set::PoolSet;
pub use stats::PoolStats;
pub use tessera_core::{ArrayError, Element, PoolingState};
