#![forbid(unsafe_code)]

//! Controller configuration: which inputs to watch, their timing, and which
//! named targets each gesture invokes.
//!
//! # Loading
//!
//! ```toml
//! debug = false
//!
//! [[button]]
//! input = "wb-gpio/A1_IN"
//! long_press_threshold_ms = 800
//!
//! [button.actions]
//! singlePress = { target = "toggle", args = ["wb-mr6c_1", "K1"] }
//! longPress = { target = "dim_up" }
//! longRelease = { target = "dim_stop" }
//! ```
//!
//! ```rust,ignore
//! let config = ControllerConfig::from_toml_file("buttons.toml")?;
//! let config = ControllerConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! Omitted or zero timing values fall back to the classifier defaults
//! (300ms / 1000ms / 100ms). Action keys are gesture names such as
//! `doublePress` or `shortLongRelease`; unknown keys are skipped at install
//! time rather than rejected here.

use std::collections::{BTreeMap, HashSet};
#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use pressgest_core::{ActionArg, InputId, TimingConfig};

// ---------------------------------------------------------------------------
// ActionSpec
// ---------------------------------------------------------------------------

/// A registered target name plus the arguments bound to it.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
pub struct ActionSpec {
    /// Name looked up in the [`ActionRegistry`](crate::ActionRegistry).
    pub target: String,
    /// Arguments passed on every invocation.
    #[cfg_attr(feature = "config", serde(default))]
    pub args: Vec<ActionArg>,
}

impl ActionSpec {
    #[must_use]
    pub fn new(target: impl Into<String>, args: Vec<ActionArg>) -> Self {
        Self {
            target: target.into(),
            args,
        }
    }
}

// ---------------------------------------------------------------------------
// ButtonConfig
// ---------------------------------------------------------------------------

/// One monitored input.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ButtonConfig {
    /// Input name, `"<device>/<control>"`.
    pub input: String,
    /// Default: 300. Zero means default.
    pub short_release_timeout_ms: u64,
    /// Default: 1000. Zero means default.
    pub long_press_threshold_ms: u64,
    /// Default: 100. Zero means default.
    pub repeat_interval_ms: u64,
    /// Gesture name → action.
    pub actions: BTreeMap<String, ActionSpec>,
}

impl ButtonConfig {
    /// A button with default timing and no actions.
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn input_id(&self) -> InputId {
        InputId::new(self.input.as_str())
    }

    /// Timing with zero fields replaced by defaults.
    #[must_use]
    pub fn timing(&self) -> TimingConfig {
        TimingConfig::from_millis(
            self.short_release_timeout_ms,
            self.long_press_threshold_ms,
            self.repeat_interval_ms,
        )
    }
}

// ---------------------------------------------------------------------------
// ControllerConfig
// ---------------------------------------------------------------------------

/// Top-level configuration for a set of buttons.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ControllerConfig {
    /// Turn on classification diagnostics when installed.
    pub debug: bool,
    /// Buttons, in installation order.
    #[cfg_attr(feature = "config", serde(rename = "button"))]
    pub buttons: Vec<ButtonConfig>,
}

impl ControllerConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Check structural constraints.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for (i, button) in self.buttons.iter().enumerate() {
            if button.input.trim().is_empty() {
                errors.push(format!("button[{i}].input must not be empty"));
                continue;
            }
            if !seen.insert(button.input.as_str()) {
                errors.push(format!(
                    "button[{i}].input {:?} is configured more than once",
                    button.input
                ));
            }
            for (name, spec) in &button.actions {
                if spec.target.is_empty() {
                    errors.push(format!("button[{i}].actions.{name}.target must not be empty"));
                }
            }
        }

        errors
    }

    /// [`validate`](Self::validate), as a `Result`.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a controller configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
