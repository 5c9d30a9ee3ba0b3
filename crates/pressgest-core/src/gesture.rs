#![forbid(unsafe_code)]

//! Gesture classification: turns a button's pressed/released level stream
//! into press-count and long-press gestures.
//!
//! [`GestureClassifier`] is a per-input state machine. Level changes arrive
//! through [`on_level_change`](GestureClassifier::on_level_change); timer
//! expiry is delivered by [`advance`](GestureClassifier::advance). Both take
//! the current [`Instant`], so the machine is deterministic and can be driven
//! by a real clock or by a test.
//!
//! # State Machine
//!
//! Three timers cooperate:
//!
//! - **Long-press timer**: armed on every press outside a long-press episode.
//!   On expiry it opens an episode indexed by the number of short presses that
//!   preceded the hold (`longPress`, `shortLongPress`, `doubleShortLongPress`,
//!   ...), fires the long-press action once and resets the press count.
//! - **Repeat timer**: armed when the episode's release action is configured.
//!   Re-fires the long-press action every `repeat_interval` until release.
//! - **Finalize timer**: armed on every release outside an episode. On expiry
//!   it fires the action for the accumulated press count (`singlePress`,
//!   `doublePress`, ...) and resets the count.
//!
//! # Invariants
//!
//! 1. Every timer is cancelled before it is rearmed, and a cancelled timer
//!    never fires.
//! 2. The press count resets exactly when a run finalizes or an episode opens.
//! 3. A re-press inside `short_release_timeout` cancels the finalize timer
//!    without firing it, so the run is extended, never finalized early.
//! 4. Timers due at or before an event's timestamp fire before the event is
//!    applied, each at its own deadline.
//! 5. A release ending an episode fires the release action exactly once and no
//!    repeat follows it.
//!
//! # Failure Modes
//!
//! - Gestures without a configured action are recorded with
//!   `dispatched == false` and have no other effect.
//! - Press counts beyond the configured ladder are dropped the same way; the
//!   count still resets.
//! - A press while an episode is active (duplicate level from the watcher)
//!   cancels stale timers and is otherwise ignored.

use std::fmt;

use web_time::Instant;

use crate::action::ActionTable;
use crate::config::{GestureConfig, TimingConfig};
use crate::diag;
use crate::input::InputId;
use crate::kind::Gesture;
use crate::timer::TimerSlot;

// ---------------------------------------------------------------------------
// Public state and output types
// ---------------------------------------------------------------------------

/// Long-press episode state. The payload is the compound index: how many
/// short presses preceded the hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LongPressEpisode {
    #[default]
    Inactive,
    /// The hold crossed the threshold and has not been released.
    Active(u32),
    /// Release observed; the release gesture is being handled.
    Released(u32),
}

impl LongPressEpisode {
    #[inline]
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Compound index of a running or just-released episode.
    #[must_use]
    pub fn compound_index(self) -> Option<u32> {
        match self {
            Self::Inactive => None,
            Self::Active(k) | Self::Released(k) => Some(k),
        }
    }
}

/// A recognized gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub gesture: Gesture,
    /// When the gesture was recognized (a timer deadline or the event time).
    pub at: Instant,
    /// Whether an action was bound and invoked.
    pub dispatched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    LongPress,
    Repeat,
    Finalize,
}

// ---------------------------------------------------------------------------
// GestureClassifier
// ---------------------------------------------------------------------------

/// Per-input gesture state machine.
///
/// Call [`on_level_change`](Self::on_level_change) for every transition of
/// the input and [`advance`](Self::advance) when
/// [`next_deadline`](Self::next_deadline) passes.
pub struct GestureClassifier {
    input: InputId,
    timing: TimingConfig,
    actions: ActionTable,

    short_press_count: u32,
    episode: LongPressEpisode,

    long_press_timer: TimerSlot,
    finalize_timer: TimerSlot,
    repeat_timer: TimerSlot,

    // Repeats fired in the current episode
    repeats: u32,
}

impl fmt::Debug for GestureClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureClassifier")
            .field("input", &self.input)
            .field("short_press_count", &self.short_press_count)
            .field("episode", &self.episode)
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}

impl GestureClassifier {
    /// Create a classifier for `input`. Zero timings fall back to defaults.
    #[must_use]
    pub fn new(input: impl Into<InputId>, config: GestureConfig) -> Self {
        let input = input.into();
        let GestureConfig { timing, actions } = config;
        let timing = timing.normalized();
        diag!(
            input = %input,
            timing = ?timing,
            actions = actions.len(),
            "classifier created"
        );
        Self {
            input,
            timing,
            actions,
            short_press_count: 0,
            episode: LongPressEpisode::Inactive,
            long_press_timer: TimerSlot::new(),
            finalize_timer: TimerSlot::new(),
            repeat_timer: TimerSlot::new(),
            repeats: 0,
        }
    }

    /// Apply a level change observed at `now`.
    ///
    /// Timers due at or before `now` fire first. Returns every gesture
    /// recognized during the call, in order.
    pub fn on_level_change(&mut self, pressed: bool, now: Instant) -> Vec<Fired> {
        let mut out = Vec::new();
        self.fire_due(now, &mut out);
        if pressed {
            self.on_press(now);
        } else {
            self.on_release(now, &mut out);
        }
        out
    }

    /// Fire every timer due at or before `now`, in deadline order.
    pub fn advance(&mut self, now: Instant) -> Vec<Fired> {
        let mut out = Vec::new();
        self.fire_due(now, &mut out);
        out
    }

    /// Earliest pending timer deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.long_press_timer.deadline(),
            self.repeat_timer.deadline(),
            self.finalize_timer.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Cancel every timer and return to idle without firing anything.
    pub fn reset(&mut self) {
        self.long_press_timer.cancel();
        self.finalize_timer.cancel();
        self.repeat_timer.cancel();
        self.short_press_count = 0;
        self.episode = LongPressEpisode::Inactive;
        self.repeats = 0;
        diag!(input = %self.input, "classifier reset");
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &InputId {
        &self.input
    }

    /// Effective timing, after defaults were applied.
    #[inline]
    #[must_use]
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    #[inline]
    #[must_use]
    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    /// Completed press-release cycles in the current run.
    #[inline]
    #[must_use]
    pub fn short_press_count(&self) -> u32 {
        self.short_press_count
    }

    #[inline]
    #[must_use]
    pub fn episode(&self) -> LongPressEpisode {
        self.episode
    }
}

// ---------------------------------------------------------------------------
// Internal event handlers
// ---------------------------------------------------------------------------

impl GestureClassifier {
    fn on_press(&mut self, now: Instant) {
        if self.finalize_timer.cancel() {
            diag!(input = %self.input, count = self.short_press_count, "finalize timer cleared on press");
        }
        if self.long_press_timer.cancel() {
            diag!(input = %self.input, "long-press timer cleared on press");
        }

        if self.episode.is_active() {
            diag!(input = %self.input, episode = ?self.episode, "press during long press ignored");
            return;
        }

        self.long_press_timer
            .arm(now, self.timing.long_press_threshold);
    }

    fn on_release(&mut self, now: Instant, out: &mut Vec<Fired>) {
        if let LongPressEpisode::Active(k) = self.episode {
            self.end_episode(k, now, out);
            return;
        }

        if self.long_press_timer.cancel() {
            diag!(input = %self.input, "long-press timer cleared on release");
        }
        self.short_press_count = self.short_press_count.saturating_add(1);
        self.finalize_timer
            .arm(now, self.timing.short_release_timeout);
        diag!(input = %self.input, count = self.short_press_count, "short press counted");
    }

    fn end_episode(&mut self, k: u32, now: Instant, out: &mut Vec<Fired>) {
        self.repeat_timer.cancel();
        self.episode = LongPressEpisode::Released(k);
        diag!(input = %self.input, compound = k, repeats = self.repeats, "long press released");

        self.fire(Gesture::LongRelease(k), now, out);

        self.episode = LongPressEpisode::Inactive;
        self.repeats = 0;
    }

    fn fire_due(&mut self, now: Instant, out: &mut Vec<Fired>) {
        loop {
            let next = [
                (TimerKind::LongPress, self.long_press_timer.due_at(now)),
                (TimerKind::Repeat, self.repeat_timer.due_at(now)),
                (TimerKind::Finalize, self.finalize_timer.due_at(now)),
            ]
            .into_iter()
            .filter_map(|(kind, due)| due.map(|at| (at, kind)))
            .min_by_key(|(at, _)| *at);

            let Some((at, kind)) = next else {
                break;
            };

            match kind {
                TimerKind::LongPress => self.on_long_press_timer(at, out),
                TimerKind::Repeat => self.on_repeat_timer(at, out),
                TimerKind::Finalize => self.on_finalize_timer(at, out),
            }
        }
    }

    fn on_long_press_timer(&mut self, at: Instant, out: &mut Vec<Fired>) {
        self.long_press_timer.cancel();

        let k = self.short_press_count;
        self.episode = LongPressEpisode::Active(k);
        self.repeats = 0;
        diag!(input = %self.input, compound = k, "long press started");

        let gesture = Gesture::LongPress(k);
        self.fire(gesture, at, out);

        // Without a release action the long press fires once.
        if self.actions.contains(gesture) && self.actions.has_release(k) {
            self.repeat_timer.arm(at, self.timing.repeat_interval);
        }

        self.short_press_count = 0;
    }

    fn on_repeat_timer(&mut self, at: Instant, out: &mut Vec<Fired>) {
        self.repeat_timer.cancel();
        let LongPressEpisode::Active(k) = self.episode else {
            return;
        };

        self.repeats = self.repeats.saturating_add(1);
        diag!(input = %self.input, compound = k, repeat = self.repeats, "long press repeat");
        self.fire(Gesture::LongPress(k), at, out);
        self.repeat_timer.arm(at, self.timing.repeat_interval);
    }

    fn on_finalize_timer(&mut self, at: Instant, out: &mut Vec<Fired>) {
        self.finalize_timer.cancel();
        let count = std::mem::take(&mut self.short_press_count);
        if count == 0 {
            return;
        }
        self.fire(Gesture::Press(count), at, out);
    }

    fn fire(&self, gesture: Gesture, at: Instant, out: &mut Vec<Fired>) {
        let dispatched = self.actions.dispatch(gesture);
        diag!(input = %self.input, gesture = %gesture, dispatched, "gesture");
        out.push(Fired {
            gesture,
            at,
            dispatched,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
