#![forbid(unsafe_code)]

//! Classifier configuration: timing thresholds and the action table.

use web_time::Duration;

use crate::action::{Action, ActionTable};
use crate::kind::Gesture;

/// Thresholds and timeouts for gesture classification.
///
/// A zero duration means "not set" and is replaced by the default when the
/// classifier is built (see [`TimingConfig::normalized`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Wait after a release before a short-press run is finalized (default: 300ms).
    pub short_release_timeout: Duration,
    /// Hold time before a press is classified as long (default: 1000ms).
    pub long_press_threshold: Duration,
    /// Period of long-press repeats while held (default: 100ms).
    pub repeat_interval: Duration,
}

impl TimingConfig {
    pub const DEFAULT_SHORT_RELEASE_TIMEOUT: Duration = Duration::from_millis(300);
    pub const DEFAULT_LONG_PRESS_THRESHOLD: Duration = Duration::from_millis(1000);
    pub const DEFAULT_REPEAT_INTERVAL: Duration = Duration::from_millis(100);

    /// Build from millisecond values; zero selects the default.
    #[must_use]
    pub fn from_millis(short_release_timeout: u64, long_press_threshold: u64, repeat_interval: u64) -> Self {
        Self {
            short_release_timeout: Duration::from_millis(short_release_timeout),
            long_press_threshold: Duration::from_millis(long_press_threshold),
            repeat_interval: Duration::from_millis(repeat_interval),
        }
        .normalized()
    }

    /// Replace every zero duration with its default.
    #[must_use]
    pub fn normalized(self) -> Self {
        fn or_default(value: Duration, default: Duration) -> Duration {
            if value.is_zero() { default } else { value }
        }
        Self {
            short_release_timeout: or_default(
                self.short_release_timeout,
                Self::DEFAULT_SHORT_RELEASE_TIMEOUT,
            ),
            long_press_threshold: or_default(
                self.long_press_threshold,
                Self::DEFAULT_LONG_PRESS_THRESHOLD,
            ),
            repeat_interval: or_default(self.repeat_interval, Self::DEFAULT_REPEAT_INTERVAL),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            short_release_timeout: Self::DEFAULT_SHORT_RELEASE_TIMEOUT,
            long_press_threshold: Self::DEFAULT_LONG_PRESS_THRESHOLD,
            repeat_interval: Self::DEFAULT_REPEAT_INTERVAL,
        }
    }
}

/// Everything a classifier needs at construction.
#[derive(Debug, Clone, Default)]
pub struct GestureConfig {
    pub timing: TimingConfig,
    pub actions: ActionTable,
}

impl GestureConfig {
    /// Default timing, no actions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub fn with_action(mut self, gesture: Gesture, action: Action) -> Self {
        self.actions.insert(gesture, action);
        self
    }

    /// Bind by configuration name. Unknown names are ignored.
    #[must_use]
    pub fn with_named_action(mut self, name: &str, action: Action) -> Self {
        self.actions.insert_named(name, action);
        self
    }
}
