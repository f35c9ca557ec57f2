//! The one-way pooling lifecycle.
//!
//! Pooling starts [`PoolingState::Enabled`] and may move to
//! [`PoolingState::Disabled`] exactly once. There is no way back: a request
//! to re-enable a disabled latch is accepted and ignored. Released blocks
//! are recycled only while the latch reads `Enabled`.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether released blocks are recycled or freed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoolingState {
    /// Released blocks are returned to their free list. Initial state.
    Enabled,
    /// Released blocks are freed immediately. Terminal state.
    Disabled,
}

impl PoolingState {
    /// Apply a requested state to the current one.
    ///
    /// `Enabled -> Disabled` is the only transition that changes anything.
    /// Requesting `Enabled` from `Disabled` is a no-op and returns
    /// `Disabled`.
    #[must_use]
    pub fn transition(self, requested: PoolingState) -> PoolingState {
        match (self, requested) {
            (Self::Enabled, Self::Disabled) => Self::Disabled,
            (current, _) => current,
        }
    }

    /// Whether this is the terminal state.
    pub fn is_terminal(self) -> bool {
        self == Self::Disabled
    }
}

impl From<bool> for PoolingState {
    /// `true` is [`PoolingState::Enabled`].
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

impl fmt::Display for PoolingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

/// Thread-safe holder of a [`PoolingState`], shared by every pool that
/// was created from the same pool set.
///
/// Internally an `AtomicBool` that can only ever be cleared. Reads use
/// `Acquire` so a release observing `Disabled` also observes everything
/// the disabling thread did beforehand (notably a completed flush).
#[derive(Debug)]
pub struct PoolingLatch {
    enabled: AtomicBool,
}

impl PoolingLatch {
    /// Create a latch in the given initial state.
    pub fn new(initial: PoolingState) -> Self {
        Self {
            enabled: AtomicBool::new(initial == PoolingState::Enabled),
        }
    }

    /// Current state.
    pub fn state(&self) -> PoolingState {
        PoolingState::from(self.is_enabled())
    }

    /// Whether released blocks should currently be recycled.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Move to `Disabled`.
    ///
    /// Returns `true` if this call performed the transition, `false` if the
    /// latch was already disabled.
    pub fn disable(&self) -> bool {
        let was_enabled = self.enabled.swap(false, Ordering::AcqRel);
        if was_enabled {
            tracing::info!("array pooling disabled");
        }
        was_enabled
    }

    /// Request a state and return the resulting one.
    ///
    /// The outcome is decided by [`PoolingState::transition`]: `false`
    /// disables the latch, `true` is a pure query that never re-enables a
    /// disabled latch.
    pub fn request(&self, enabled: bool) -> PoolingState {
        let current = self.state();
        let next = current.transition(PoolingState::from(enabled));
        if current != next {
            // Enabled -> Disabled is the only edge `transition` yields.
            self.disable();
        }
        self.state()
    }
}

impl Default for PoolingLatch {
    fn default() -> Self {
        Self::new(PoolingState::Enabled)
    }
}
