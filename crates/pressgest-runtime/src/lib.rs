#![forbid(unsafe_code)]

//! Runtime: drives gesture classifiers in real time and wires them to inputs
//! and actions.
//!
//! # Role in pressgest
//! `pressgest-core` decides; this crate owns threads, clocks and
//! configuration. Each monitored input gets one [`ClassifierDriver`] thread
//! that is the only code touching its classifier, which serializes level
//! changes and timer expiry by construction.
//!
//! # Primary responsibilities
//! - **ClassifierDriver**: per-input thread that sleeps until the next timer
//!   deadline or level change.
//! - **InputWatcher**: injected subscription capability delivering level
//!   changes; [`LocalWatcher`] is the in-process implementation.
//! - **ActionRegistry**: named action targets that configuration refers to.
//! - **ButtonSet**: installs one rule per configured input.
//! - **ControllerConfig**: TOML/JSON configuration (feature `config`).
//!
//! # Example
//!
//! ```
//! use pressgest_runtime::{ActionRegistry, ButtonConfig, ButtonSet, ControllerConfig, LocalWatcher};
//! use pressgest_runtime::config::ActionSpec;
//!
//! let mut registry = ActionRegistry::new();
//! registry.register_fn("toggle", |args| println!("toggle {args:?}"));
//!
//! let mut button = ButtonConfig::new("wb-gpio/A1_IN");
//! button.actions.insert("singlePress".into(), ActionSpec::new("toggle", vec!["K1".into()]));
//! let config = ControllerConfig { debug: false, buttons: vec![button] };
//!
//! let watcher = LocalWatcher::new();
//! let buttons = ButtonSet::install(&watcher, &registry, &config).unwrap();
//! watcher.publish(&"wb-gpio/A1_IN".into(), true);
//! watcher.publish(&"wb-gpio/A1_IN".into(), false);
//! buttons.shutdown();
//! ```

pub mod button_set;
pub mod config;
pub mod driver;
pub mod logging;
pub mod registry;
pub mod watcher;

pub use button_set::{ButtonSet, InstallError};
pub use config::{ButtonConfig, ConfigError, ControllerConfig};
pub use driver::{ClassifierDriver, DriverError, LevelChange, LevelSender};
pub use registry::ActionRegistry;
pub use watcher::{InputWatcher, LevelCallback, LocalWatcher, WatchError, WatchHandle};

pub use pressgest_core::{
    Action, ActionArg, Fired, Gesture, GestureClassifier, GestureConfig, InputId, TimingConfig,
    set_debug_mode,
};
