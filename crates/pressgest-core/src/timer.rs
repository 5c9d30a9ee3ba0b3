#![forbid(unsafe_code)]

//! Deadline slots used as the classifier's timers.
//!
//! A [`TimerSlot`] is a one-shot timer whose only state is an optional
//! deadline. Liveness is the presence of that deadline, never a sentinel.
//!
//! # Invariants
//!
//! 1. Cancelling an unarmed slot is a no-op.
//! 2. Arming always cancels first, so a slot holds at most one deadline.
//! 3. A cancelled slot can never report itself due.

use web_time::{Duration, Instant};

/// A single owned one-shot timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerSlot {
    deadline: Option<Instant>,
}

impl TimerSlot {
    /// Create an unarmed slot.
    #[must_use]
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Arm the slot to expire `after` from `now`, replacing any pending deadline.
    ///
    /// A deadline that would overflow the clock leaves the slot unarmed.
    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.cancel();
        self.deadline = now.checked_add(after);
    }

    /// Cancel the slot. Returns `true` if a deadline was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Whether a deadline is pending.
    #[inline]
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// The pending deadline, if any.
    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The pending deadline if it is at or before `now`.
    #[inline]
    #[must_use]
    pub fn due_at(&self, now: Instant) -> Option<Instant> {
        self.deadline.filter(|deadline| *deadline <= now)
    }
}
