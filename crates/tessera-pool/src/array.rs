//! The pooled array handle.
//!
//! [`Array<T>`] is a value type over a shared, fixed-length block. Cloning
//! shares; moving transfers; dropping returns the block to its pool once
//! the last sharer is gone. Mutation through a shared block is never
//! allowed: the safe mutable paths check uniqueness, and the unchecked path
//! makes it the caller's obligation.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::sync::Arc;

use tessera_core::{ArrayError, Element};

use crate::block::{self, Block};

/// A reference-counted, copy-on-write array whose storage is recycled by
/// an [`ArrayPool`](crate::ArrayPool).
///
/// ```
/// use tessera_pool::{ArrayPool, copy};
///
/// let pool = ArrayPool::<f64>::new();
/// let mut a = pool.filled(4, 1.0);
/// let mut b = a.clone(); // shares storage
/// assert!(!a.is_unique());
///
/// b.ensure_unique(); // copy-on-write promotion
/// b[0] = 5.0;
/// assert_eq!(a[0], 1.0);
///
/// let c = copy(&a); // independent copy
/// assert!(c.is_unique());
/// a.clear();
/// assert!(a.is_empty());
/// ```
pub struct Array<T: Element> {
    block: Option<Arc<Block<T>>>,
}

impl<T: Element> Array<T> {
    /// An empty array with no storage.
    pub const fn new() -> Self {
        Self { block: None }
    }

    pub(crate) fn from_block(block: Arc<Block<T>>) -> Self {
        Self { block: Some(block) }
    }

    /// Number of elements, or 0 if empty.
    #[inline]
    pub fn len(&self) -> usize {
        self.block.as_ref().map_or(0, |b| b.len())
    }

    /// Whether the array holds no storage.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.block.is_none()
    }

    /// Whether no other array shares this array's storage.
    ///
    /// An empty array is trivially unique.
    pub fn is_unique(&self) -> bool {
        self.ref_count() <= 1
    }

    /// Number of arrays sharing this array's storage, or 0 if empty.
    pub fn ref_count(&self) -> usize {
        self.block.as_ref().map_or(0, Arc::strong_count)
    }

    /// Whether `self` and `other` share the same storage.
    pub fn shares_with(&self, other: &Self) -> bool {
        match (&self.block, &other.block) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Pointer to the first element, or null if empty.
    ///
    /// Two arrays with the same pointer share storage. Useful for checking
    /// that a block was recycled.
    pub fn as_ptr(&self) -> *const T {
        self.block
            .as_ref()
            .map_or(std::ptr::null(), |b| b.as_ptr())
    }

    /// Release the storage. The array is empty afterwards.
    pub fn clear(&mut self) {
        if let Some(old) = self.block.take() {
            block::release(old);
        }
    }

    /// Move the storage out, leaving this array empty.
    #[must_use]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Share `other`'s storage, releasing the current one.
    ///
    /// The new block is adopted before the old one is released, so
    /// assigning an array to itself or to one of its aliases never drops
    /// the last reference to the data being kept.
    pub fn assign(&mut self, other: &Self) {
        let old = std::mem::replace(&mut self.block, other.block.clone());
        if let Some(old) = old {
            block::release(old);
        }
    }

    /// Make sure no other array shares this storage.
    ///
    /// No-op when empty or already unique. Otherwise takes a block of the
    /// same length from the pool, clones every element into it in index
    /// order, adopts it and releases the shared one.
    ///
    /// Element access never calls this implicitly.
    pub fn ensure_unique(&mut self) {
        let Some(current) = self.block.as_mut() else {
            return;
        };
        if Arc::get_mut(current).is_some() {
            return;
        }

        let len = current.len();
        let mut fresh = match current.home() {
            Some(bucket) => bucket.take(),
            None => Arc::new(Block::detached(len)),
        };
        Arc::get_mut(&mut fresh)
            .expect("blocks handed out by a bucket have a single owner")
            .as_mut_slice()
            .clone_from_slice(current.as_slice());

        let old = std::mem::replace(current, fresh);
        block::release(old);
    }

    /// Exchange storage with `other` in O(1). Lengths may differ.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.block, &mut other.block);
    }

    /// All elements as a slice. Empty if the array is empty.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        match self.block.as_deref() {
            Some(block) => block.as_slice(),
            None => &[],
        }
    }

    /// All elements as a mutable slice.
    ///
    /// The sharing check costs an atomic compare-and-swap plus an acquire
    /// load. Take the slice once per loop rather than indexing with
    /// `a[i] = x` element by element.
    ///
    /// # Panics
    ///
    /// Panics if the storage is shared. Call
    /// [`ensure_unique`](Self::ensure_unique) first, or use
    /// [`try_as_mut_slice`](Self::try_as_mut_slice).
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self.try_as_mut_slice() {
            Ok(slice) => slice,
            Err(err) => panic!("{err}"),
        }
    }

    /// All elements as a mutable slice, or [`ArrayError::Shared`] if the
    /// storage is shared. An empty array yields an empty slice.
    pub fn try_as_mut_slice(&mut self) -> Result<&mut [T], ArrayError> {
        let Some(current) = self.block.as_mut() else {
            return Ok(&mut []);
        };
        let refs = Arc::strong_count(current);
        Arc::get_mut(current)
            .map(Block::as_mut_slice)
            .ok_or(ArrayError::Shared { refs })
    }

    /// Iterate over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterate mutably over the elements.
    ///
    /// # Panics
    ///
    /// Panics if the storage is shared.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Element `index`, or `None` if out of range or empty.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Checked element access.
    pub fn at(&self, index: usize) -> Result<&T, ArrayError> {
        let Some(current) = self.block.as_deref() else {
            return Err(ArrayError::Empty);
        };
        let len = current.len();
        current
            .as_slice()
            .get(index)
            .ok_or(ArrayError::OutOfBounds { index, len })
    }

    /// Checked mutable element access.
    ///
    /// Fails with [`ArrayError::Empty`], [`ArrayError::OutOfBounds`] or
    /// [`ArrayError::Shared`].
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, ArrayError> {
        if self.is_empty() {
            return Err(ArrayError::Empty);
        }
        let slice = self.try_as_mut_slice()?;
        let len = slice.len();
        slice
            .get_mut(index)
            .ok_or(ArrayError::OutOfBounds { index, len })
    }

    /// Element `index` with no emptiness or bounds check.
    ///
    /// # Safety
    ///
    /// The array must not be empty and `index < self.len()`.
    #[inline]
    #[allow(unsafe_code)]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        // SAFETY: the caller guarantees a block is held and index is in
        // bounds.
        unsafe { self.block.as_deref().unwrap_unchecked().raw().get_unchecked(index) }
    }

    /// Mutable element `index` with no emptiness, bounds or sharing check.
    ///
    /// This is the hot-loop path: it compiles to a single indexed load.
    ///
    /// # Safety
    ///
    /// The array must not be empty, `index < self.len()`, and the storage
    /// must not be shared (see [`is_unique`](Self::is_unique) and
    /// [`ensure_unique`](Self::ensure_unique)). Writing through a shared
    /// block is a data race with every other sharer.
    #[inline]
    #[allow(unsafe_code)]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        // SAFETY: the caller guarantees a block is held, index is in bounds
        // and no other array references the block; `&mut self` excludes
        // other borrows through this array.
        unsafe {
            self.block
                .as_deref()
                .unwrap_unchecked()
                .raw()
                .get_unchecked_mut(index)
        }
    }
}

impl<T: Element> Default for Array<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> Clone for Array<T> {
    /// Share storage with `self`. No element is copied.
    fn clone(&self) -> Self {
        Self {
            block: self.block.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign(source);
    }
}

impl<T: Element> Drop for Array<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: Element> Index<usize> for Array<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T: Element> IndexMut<usize> for Array<T> {
    /// Checks bounds and sharing on every write, so each `a[i] = x` pays
    /// for an atomic uniqueness test. In hot loops use
    /// [`Array::as_mut_slice`] once, or [`Array::get_unchecked_mut`], the
    /// only branch-free element path.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range or the storage is shared.
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

impl<T: Element> AsRef<[T]> for Array<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<'a, T: Element> IntoIterator for &'a Array<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: Element> IntoIterator for &'a mut Array<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: Element + PartialEq> PartialEq for Array<T> {
    /// Element-wise comparison. Empty equals zero-length.
    fn eq(&self, other: &Self) -> bool {
        self.shares_with(other) || self.as_slice() == other.as_slice()
    }
}

impl<T: Element + fmt::Debug> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("len", &self.len())
            .field("refs", &self.ref_count())
            .field("data", &self.as_slice())
            .finish()
    }
}

/// An array with the same contents as `array` that shares no storage
/// with it.
pub fn copy<T: Element>(array: &Array<T>) -> Array<T> {
    let mut out = array.clone();
    out.ensure_unique();
    out
}

/// Exchange the storage of two arrays in O(1).
pub fn swap<T: Element>(a: &mut Array<T>, b: &mut Array<T>) {
    a.swap(b);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArrayPool;

    #[test]
    fn default_is_empty() {
        let a = Array::<f64>::default();
        assert!(a.is_empty());
        assert_eq!(a.len(), 0);
        assert!(a.is_unique());
        assert_eq!(a.ref_count(), 0);
        assert!(a.as_ptr().is_null());
        assert_eq!(a.iter().count(), 0);
    }

    #[test]
    fn clone_shares_storage() {
        let pool = ArrayPool::<f64>::new();
        let a = pool.filled(4, 2.5);
        let b = a.clone();
        assert!(!a.is_unique());
        assert!(!b.is_unique());
        assert_eq!(a.ref_count(), 2);
        assert!(a.shares_with(&b));
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn ensure_unique_detaches() {
        let pool = ArrayPool::<f64>::new();
        let a = pool.filled(4, 1.0);
        let mut b = a.clone();
        b.ensure_unique();
        assert!(b.is_unique());
        assert!(a.is_unique());
        assert!(!a.shares_with(&b));
        b[2] = 9.0;
        assert_eq!(a[2], 1.0);
        assert_eq!(b[2], 9.0);
    }

    #[test]
    fn ensure_unique_is_noop_when_unique() {
        let pool = ArrayPool::<f64>::new();
        let mut a = pool.array(4);
        let ptr = a.as_ptr();
        a.ensure_unique();
        assert_eq!(a.as_ptr(), ptr);

        let mut empty = Array::<f64>::new();
        empty.ensure_unique();
        assert!(empty.is_empty());
    }

    #[test]
    fn assign_adopts_then_releases() {
        let pool = ArrayPool::<i32>::new();
        let mut a = pool.from_slice(&[1, 2, 3]);
        let b = pool.from_slice(&[4, 5]);
        a.assign(&b);
        assert_eq!(a.as_slice(), &[4, 5]);
        assert!(a.shares_with(&b));
        // The old block of length 3 went back to the pool.
        assert_eq!(pool.free_count(3), 1);
    }

    #[test]
    fn assign_from_alias_keeps_data() {
        let pool = ArrayPool::<i32>::new();
        let mut a = pool.from_slice(&[7, 8]);
        let alias = a.clone();
        drop(a.clone());
        a.assign(&alias);
        drop(alias);
        assert_eq!(a.as_slice(), &[7, 8]);
        assert!(a.is_unique());
        assert_eq!(pool.free_count(2), 0);
    }

    #[test]
    fn clone_from_shares() {
        let pool = ArrayPool::<i32>::new();
        let src = pool.from_slice(&[1]);
        let mut dst = pool.array(5);
        dst.clone_from(&src);
        assert!(dst.shares_with(&src));
        assert_eq!(pool.free_count(5), 1);
    }

    #[test]
    fn take_leaves_source_empty() {
        let pool = ArrayPool::<u8>::new();
        let mut a = pool.from_slice(&[1, 2]);
        let ptr = a.as_ptr();
        let b = a.take();
        assert!(a.is_empty());
        assert_eq!(b.as_ptr(), ptr);
        assert!(b.is_unique());
    }

    #[test]
    fn clear_releases_to_pool() {
        let pool = ArrayPool::<u8>::new();
        let mut a = pool.array(3);
        a.clear();
        assert!(a.is_empty());
        assert_eq!(pool.free_count(3), 1);
        a.clear();
        assert_eq!(pool.free_count(3), 1);
    }

    #[test]
    fn swap_exchanges_storage_of_different_lengths() {
        let pool = ArrayPool::<i32>::new();
        let mut a = pool.from_slice(&[1, 2, 3]);
        let mut b = pool.from_slice(&[9]);
        let (pa, pb) = (a.as_ptr(), b.as_ptr());
        swap(&mut a, &mut b);
        assert_eq!(a.as_slice(), &[9]);
        assert_eq!(b.as_slice(), &[1, 2, 3]);
        assert_eq!(a.as_ptr(), pb);
        assert_eq!(b.as_ptr(), pa);
    }

    #[test]
    fn swap_with_empty() {
        let pool = ArrayPool::<i32>::new();
        let mut a = pool.from_slice(&[1]);
        let mut b = Array::new();
        a.swap(&mut b);
        assert!(a.is_empty());
        assert_eq!(b.as_slice(), &[1]);
    }

    #[test]
    fn copy_is_independent() {
        let pool = ArrayPool::<i32>::new();
        let a = pool.from_slice(&[1, 2]);
        let mut c = copy(&a);
        assert!(!c.shares_with(&a));
        c[0] = 10;
        assert_eq!(a[0], 1);
        assert_eq!(copy(&Array::<i32>::new()).len(), 0);
    }

    #[test]
    fn checked_access_reports_errors() {
        let pool = ArrayPool::<i32>::new();
        let mut a = pool.from_slice(&[1, 2]);
        assert_eq!(a.at(1), Ok(&2));
        assert_eq!(a.at(2), Err(ArrayError::OutOfBounds { index: 2, len: 2 }));
        assert_eq!(Array::<i32>::new().at(0), Err(ArrayError::Empty));

        *a.at_mut(0).unwrap() = 5;
        assert_eq!(a[0], 5);

        let _alias = a.clone();
        assert_eq!(a.at_mut(0), Err(ArrayError::Shared { refs: 2 }));
        assert!(a.try_as_mut_slice().is_err());
    }

    #[test]
    fn get_is_bounds_checked() {
        let pool = ArrayPool::<i32>::new();
        let a = pool.from_slice(&[4]);
        assert_eq!(a.get(0), Some(&4));
        assert_eq!(a.get(1), None);
        assert_eq!(Array::<i32>::new().get(0), None);
    }

    #[test]
    #[allow(unsafe_code)]
    fn unchecked_access_reads_and_writes() {
        let pool = ArrayPool::<f64>::new();
        let mut a = pool.filled(8, 0.0);
        for i in 0..a.len() {
            unsafe {
                *a.get_unchecked_mut(i) = i as f64;
            }
        }
        let sum: f64 = (0..a.len()).map(|i| unsafe { *a.get_unchecked(i) }).sum();
        assert_eq!(sum, 28.0);
    }

    #[test]
    #[should_panic(expected = "ensure_unique")]
    fn index_mut_on_shared_panics() {
        let pool = ArrayPool::<f64>::new();
        let mut a = pool.array(2);
        let _b = a.clone();
        a[0] = 1.0;
    }

    #[test]
    fn slice_once_matches_indexed_writes() {
        let pool = ArrayPool::<f64>::new();
        let mut indexed = pool.array(64);
        for i in 0..indexed.len() {
            indexed[i] = i as f64;
        }
        let mut sliced = pool.array(64);
        for (i, v) in sliced.as_mut_slice().iter_mut().enumerate() {
            *v = i as f64;
        }
        assert_eq!(indexed, sliced);
    }

    #[test]
    #[should_panic]
    fn index_out_of_range_panics() {
        let pool = ArrayPool::<f64>::new();
        let a = pool.array(2);
        let _ = a[2];
    }

    #[test]
    fn iteration_visits_elements_in_order() {
        let pool = ArrayPool::<i32>::new();
        let mut a = pool.from_slice(&[1, 2, 3]);
        for v in &mut a {
            *v *= 2;
        }
        let collected: Vec<i32> = (&a).into_iter().copied().collect();
        assert_eq!(collected, vec![2, 4, 6]);
        // Restartable.
        assert_eq!(a.iter().count(), 3);
        assert_eq!(a.iter().sum::<i32>(), 12);
    }

    #[test]
    fn equality_compares_contents() {
        let pool = ArrayPool::<i32>::new();
        let a = pool.from_slice(&[1, 2]);
        let b = pool.from_slice(&[1, 2]);
        assert_eq!(a, b);
        assert_eq!(a, a.clone());
        assert_ne!(a, pool.from_slice(&[2, 1]));
        assert_eq!(Array::<i32>::new(), pool.array(0));
    }

    #[test]
    fn debug_shows_len_and_data() {
        let pool = ArrayPool::<i32>::new();
        let a = pool.from_slice(&[3]);
        let s = format!("{a:?}");
        assert!(s.contains("len: 1"));
        assert!(s.contains("[3]"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn len_matches_request(len in 0usize..4096) {
                let pool = ArrayPool::<f32>::new();
                let a = pool.array(len);
                prop_assert_eq!(a.len(), len);
                prop_assert_eq!(a.is_empty(), len == 0);
            }

            #[test]
            fn cow_never_leaks_writes(
                values in proptest::collection::vec(any::<i64>(), 1..64),
                idx in any::<prop::sample::Index>(),
                new_value in any::<i64>(),
            ) {
                let pool = ArrayPool::<i64>::new();
                let a = pool.from_slice(&values);
                let mut b = a.clone();
                b.ensure_unique();
                let i = idx.index(values.len());
                b[i] = new_value;
                prop_assert_eq!(a.as_slice(), values.as_slice());
                prop_assert_eq!(b[i], new_value);
            }

            #[test]
            fn free_list_matches_released_blocks(count in 1usize..32) {
                let pool = ArrayPool::<u8>::new();
                let arrays: Vec<_> = (0..count).map(|_| pool.array(16)).collect();
                let mut ptrs: Vec<_> = arrays.iter().map(|a| a.as_ptr()).collect();
                drop(arrays);
                prop_assert_eq!(pool.free_count(16), count);
                let again: Vec<_> = (0..count).map(|_| pool.array(16)).collect();
                let mut reused: Vec<_> = again.iter().map(|a| a.as_ptr()).collect();
                ptrs.sort();
                reused.sort();
                prop_assert_eq!(ptrs, reused);
            }
        }
    }
}
