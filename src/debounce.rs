//! Trailing-edge debounce driven by the UI tick.
//!
//! The event loop owns the clock: every input change calls
//! [`Debouncer::schedule`] with the current [`Instant`], and every tick calls
//! [`Debouncer::poll`].  A value is emitted once, and only after it has been
//! stable for the full delay.  Nothing is emitted on the leading edge.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    value: T,
    pending: Option<(T, Instant)>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    /// Start settled on `initial`.
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            delay,
            value: initial,
            pending: None,
        }
    }

    /// The last emitted value.
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace any pending update with `input`, due `delay` after `now`.
    pub fn schedule(&mut self, input: T, now: Instant) {
        self.pending = Some((input, now + self.delay));
    }

    /// Emit the pending value if its deadline has passed.
    ///
    /// Returns `Some` only when the emitted value differs from the previous
    /// one; an edit that ends where it started produces no emission.
    pub fn poll(&mut self, now: Instant) -> Option<&T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => {}
            _ => return None,
        }
        let (next, _) = self.pending.take()?;
        if next == self.value {
            return None;
        }
        self.value = next;
        Some(&self.value)
    }

    /// Drop any pending update (teardown).
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
