//! Per-exchange "already responded" marker.

use std::sync::atomic::{AtomicBool, Ordering};

/// Tracks whether an exchange has been finalized.
///
/// Created unset alongside the response handle. The first
/// [`try_finalize`](Self::try_finalize) wins; every later call loses.
///
/// # Example
///
/// ```rust
/// use hermes_dispatch::ResponseState;
///
/// let state = ResponseState::new();
/// assert!(!state.is_finalized());
/// assert!(state.try_finalize());
/// assert!(!state.try_finalize());
/// assert!(state.is_finalized());
/// ```
#[derive(Debug, Default)]
pub struct ResponseState {
    finalized: AtomicBool,
}

impl ResponseState {
    /// Creates an unset marker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims finalization. Returns `true` only for the first caller.
    pub fn try_finalize(&self) -> bool {
        self.finalized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Returns `true` once the exchange has been finalized.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized.load(Ordering::Acquire)
    }
}
