//! Backing blocks: the unit of pooling.
//!
//! A [`Block`] is a fixed-length buffer plus a weak link to the bucket it
//! is recycled into. Reference counting is `Arc`'s: the strong count of an
//! `Arc<Block<T>>` is the number of arrays sharing the block, plus one
//! while the block sits in its free list.

use std::sync::{Arc, Weak};

use tessera_core::Element;

use crate::bucket::Bucket;
use crate::raw::RawBuffer;

/// Fixed-length storage shared by one or more arrays.
pub(crate) struct Block<T> {
    data: RawBuffer<T>,
    /// Free list this block returns to. Dangling when the owning pool has
    /// been dropped, or for blocks created without a pool.
    home: Weak<Bucket<T>>,
}

impl<T: Element> Block<T> {
    /// Allocate a block of `len` default-valued elements.
    pub(crate) fn new(len: usize, home: Weak<Bucket<T>>) -> Self {
        Self {
            data: RawBuffer::from_vec(vec![T::default(); len]),
            home,
        }
    }

    /// Allocate a block that is freed, never recycled, when released.
    pub(crate) fn detached(len: usize) -> Self {
        Self::new(len, Weak::new())
    }
}

impl<T> Block<T> {
    /// Number of elements. Fixed for the block's lifetime.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[T] {
        self.data.as_slice()
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        self.data.as_mut_slice()
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    /// Raw storage, for the unchecked accessors on `Array`.
    #[inline]
    pub(crate) fn raw(&self) -> &RawBuffer<T> {
        &self.data
    }

    /// The bucket this block is recycled into, if it still exists.
    pub(crate) fn home(&self) -> Option<Arc<Bucket<T>>> {
        self.home.upgrade()
    }

    /// Size of the element storage in bytes.
    pub(crate) fn memory_bytes(&self) -> usize {
        self.len() * std::mem::size_of::<T>()
    }
}

/// Give up one array's share of `block`.
///
/// Routed through the home bucket so the last-owner decision and the
/// free-list push happen under the bucket lock. A block whose bucket is
/// gone is simply dropped.
pub(crate) fn release<T: Element>(block: Arc<Block<T>>) {
    match block.home() {
        Some(bucket) => bucket.release(block),
        None => drop(block),
    }
}
