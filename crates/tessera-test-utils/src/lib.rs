//! Test utilities and sentinel element types for Tessera development.
//!
//! Provides [`CloneCounter`], an element type that counts how often it is
//! cloned, so tests can prove that sharing, moving and swapping arrays
//! never copies elements, plus fixtures and a scoped worker driver for
//! concurrency tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::Cell;

pub use fixtures::{run_workers, Complex};

thread_local! {
    static CLONES: Cell<usize> = const { Cell::new(0) };
}

/// Element that records every clone in a thread-local counter.
///
/// The counter is per thread so that tests running in parallel do not
/// see each other's clones. Wrap the code under test in
/// [`count_clones`] to read the delta.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CloneCounter(pub i64);

impl Clone for CloneCounter {
    fn clone(&self) -> Self {
        CLONES.with(|c| c.set(c.get() + 1));
        CloneCounter(self.0)
    }
}

impl CloneCounter {
    /// Total clones performed on the current thread so far.
    pub fn clones_on_this_thread() -> usize {
        CLONES.with(Cell::get)
    }
}

/// Run `f` and return its result with the number of [`CloneCounter`]
/// clones it performed on the current thread.
pub fn count_clones<R>(f: impl FnOnce() -> R) -> (R, usize) {
    let before = CloneCounter::clones_on_this_thread();
    let result = f();
    let after = CloneCounter::clones_on_this_thread();
    (result, after - before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::Element;

    #[test]
    fn clone_counter_is_an_element() {
        fn assert_element<T: Element>() {}
        assert_element::<CloneCounter>();
    }

    #[test]
    fn count_clones_measures_delta() {
        let original = CloneCounter(3);
        let (copies, n) = count_clones(|| vec![original.clone(), original.clone()]);
        assert_eq!(n, 2);
        assert_eq!(copies[1], CloneCounter(3));
    }

    #[test]
    fn moves_are_not_counted() {
        let value = CloneCounter(1);
        let (moved, n) = count_clones(move || {
            let boxed = Box::new(value);
            *boxed
        });
        assert_eq!(n, 0);
        assert_eq!(moved.0, 1);
    }
}
