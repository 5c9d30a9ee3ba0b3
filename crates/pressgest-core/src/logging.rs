#![forbid(unsafe_code)]

//! Diagnostic output toggle.
//!
//! Classification diagnostics (timer arm/cancel, episode transitions, fired
//! gestures) go through [`diag!`](crate::diag), which emits a
//! `tracing::debug!` event only while debug mode is on. The toggle is
//! process-wide and has no effect on classification.
//!
//! Events use the `pressgest.gesture` target unless another is given.

use std::sync::atomic::{AtomicBool, Ordering};

#[doc(hidden)]
pub use tracing as __tracing;

static DEBUG_MODE: AtomicBool = AtomicBool::new(false);

/// Enable or disable classification diagnostics for the whole process.
pub fn set_debug_mode(enabled: bool) {
    DEBUG_MODE.store(enabled, Ordering::Relaxed);
}

/// Whether classification diagnostics are enabled.
#[inline]
#[must_use]
pub fn debug_mode() -> bool {
    DEBUG_MODE.load(Ordering::Relaxed)
}

/// Emit a `tracing::debug!` event when debug mode is on.
///
/// Accepts the same field syntax as `tracing::debug!`, optionally preceded by
/// `target: "..."`.
#[macro_export]
macro_rules! diag {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::logging::debug_mode() {
            $crate::logging::__tracing::debug!(target: $target, $($arg)+);
        }
    };
    ($($arg:tt)+) => {
        $crate::diag!(target: "pressgest.gesture", $($arg)+)
    };
}
