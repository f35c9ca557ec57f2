//! Low-level storage for backing blocks.
//!
//! [`RawBuffer`] owns a fixed-length heap slice through a raw pointer
//! rather than a `Box<[T]>`, so that an exclusive element reference can be
//! derived from a shared `&Block` on the unchecked path. The aliasing
//! obligation sits with the caller of those methods.
//!
//! Every `unsafe` block carries a `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::marker::PhantomData;
use std::ptr::NonNull;

/// A fixed-length, heap-allocated slice of `T`.
///
/// Length is set at construction and never changes.
pub(crate) struct RawBuffer<T> {
    ptr: NonNull<[T]>,
    _owns: PhantomData<Box<[T]>>,
}

// SAFETY: RawBuffer owns its elements exactly like Box<[T]> does, so it can
// move to another thread whenever T can.
unsafe impl<T: Send> Send for RawBuffer<T> {}

// SAFETY: a shared RawBuffer hands out `&T` to any thread, and `&mut T` only
// through `unsafe` methods whose callers guarantee exclusivity. T: Sync
// covers the former; T: Send covers a `&mut T` reaching another thread.
unsafe impl<T: Send + Sync> Sync for RawBuffer<T> {}

impl<T> RawBuffer<T> {
    /// Take ownership of the elements of `data`.
    pub(crate) fn from_vec(data: Vec<T>) -> Self {
        let slice: &mut [T] = Box::leak(data.into_boxed_slice());
        Self {
            ptr: NonNull::from(slice),
            _owns: PhantomData,
        }
    }

    /// Number of elements.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.ptr.len()
    }

    /// Pointer to the first element. Dangling (but non-null) when `len() == 0`.
    #[inline]
    pub(crate) fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr() as *const T
    }

    /// Shared view of all elements.
    #[inline]
    pub(crate) fn as_slice(&self) -> &[T] {
        // SAFETY: ptr came from a leaked Box<[T]> and stays valid until Drop.
        // Mutable views are only created by `as_mut_slice` (which borrows
        // self mutably) or by `get_unchecked_mut`, whose caller guarantees
        // that no shared view is alive.
        unsafe { self.ptr.as_ref() }
    }

    /// Exclusive view of all elements.
    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: `&mut self` rules out every other view derived from self.
        unsafe { self.ptr.as_mut() }
    }

    /// Shared reference to element `index` without a bounds check.
    ///
    /// # Safety
    ///
    /// `index < self.len()`.
    #[inline]
    pub(crate) unsafe fn get_unchecked(&self, index: usize) -> &T {
        // SAFETY: the caller guarantees `index` is in bounds.
        unsafe { &*self.as_ptr().add(index) }
    }

    /// Exclusive reference to element `index` through a shared borrow.
    ///
    /// # Safety
    ///
    /// `index < self.len()`, and no other reference to this element may be
    /// alive for the returned lifetime. In practice: the owning block is
    /// held by exactly one `Array`, and that array is borrowed mutably.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn get_unchecked_mut(&self, index: usize) -> &mut T {
        // SAFETY: bounds and exclusivity are guaranteed by the caller.
        unsafe { &mut *(self.ptr.as_ptr() as *mut T).add(index) }
    }
}

impl<T> Drop for RawBuffer<T> {
    fn drop(&mut self) {
        // SAFETY: ptr was produced by Box::leak in `from_vec` and is dropped
        // exactly once, here.
        unsafe { drop(Box::from_raw(self.ptr.as_ptr())) }
    }
}
