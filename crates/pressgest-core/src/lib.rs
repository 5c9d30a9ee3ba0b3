#![forbid(unsafe_code)]

//! Core: button gesture classification and action dispatch.
//!
//! # Role in pressgest
//! `pressgest-core` is the decision layer. It owns the per-input state machine
//! that turns a pressed/released level stream into gestures, the naming table
//! that maps gestures to configuration keys, and the action table that binds a
//! gesture to a callable with bound arguments.
//!
//! # Primary responsibilities
//! - **GestureClassifier**: timer-driven disambiguation of short-press runs,
//!   long presses, compound short+long presses, repeat and release.
//! - **Gesture**: tagged gesture value with an extensible name table
//!   (`singlePress`, `doubleShortLongRelease`, `press12`, ...).
//! - **ActionTable / Invocable**: index-addressed action ladders.
//! - **Diagnostics**: process-wide debug toggle gating `tracing` output.
//!
//! # How it fits in the system
//! The classifier is sans-IO: every call takes the current [`web_time::Instant`]
//! and timers are deadline slots. `pressgest-runtime` owns the threads, the
//! input watcher and configuration files, and drives classifiers in real time.

pub mod action;
pub mod config;
pub mod gesture;
pub mod input;
pub mod kind;
pub mod logging;
pub mod timer;

pub use action::{Action, ActionArg, ActionTable, Invocable, MAX_GESTURE_INDEX};
pub use config::{GestureConfig, TimingConfig};
pub use gesture::{Fired, GestureClassifier, LongPressEpisode};
pub use input::InputId;
pub use kind::{Gesture, UnknownGesture};
pub use logging::{debug_mode, set_debug_mode};
pub use timer::TimerSlot;
