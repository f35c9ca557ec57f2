//! Core types and traits for Tessera pooled array storage.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the pool and every consumer of it: the
//! [`Element`] bound on stored values, the one-way pooling lifecycle,
//! and the error type returned by checked array access.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod element;
pub mod error;
pub mod lifecycle;

pub use element::Element;
pub use error::ArrayError;
pub use lifecycle::{PoolingLatch, PoolingState};
