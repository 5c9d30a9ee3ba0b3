#![forbid(unsafe_code)]

//! Installs one gesture rule per configured button.
//!
//! For every [`ButtonConfig`] the set builds a [`GestureClassifier`] with the
//! configured timing and the actions resolved through an [`ActionRegistry`],
//! moves it onto a [`ClassifierDriver`], and subscribes the driver to the
//! button's input. The rule is named after the input
//! (`on_button_press_<device>_<control>`).
//!
//! # Failure Modes
//!
//! - Unknown gesture names, gestures beyond
//!   [`MAX_GESTURE_INDEX`](pressgest_core::MAX_GESTURE_INDEX) and unregistered
//!   targets are skipped; the rest of the button still installs.
//! - Invalid configuration, a refused subscription, or a driver that cannot
//!   start aborts the install. Buttons installed before the failure are
//!   stopped when the partial set is dropped.

use std::fmt;

use pressgest_core::{
    ActionTable, Gesture, GestureClassifier, GestureConfig, InputId, MAX_GESTURE_INDEX, diag,
    set_debug_mode,
};

use crate::config::{ButtonConfig, ConfigError, ControllerConfig};
use crate::driver::{ClassifierDriver, DriverError, LevelSender};
use crate::registry::ActionRegistry;
use crate::watcher::{InputWatcher, WatchError, WatchHandle};

/// Errors from [`ButtonSet::install`].
#[derive(Debug)]
pub enum InstallError {
    /// The configuration failed validation.
    Config(ConfigError),
    /// The input is already installed in this set.
    DuplicateInput(InputId),
    /// The watcher refused the subscription.
    Watch { input: InputId, source: WatchError },
    /// The driver thread could not start.
    Driver(DriverError),
}

impl fmt::Display for InstallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::DuplicateInput(input) => write!(f, "input {input} is already installed"),
            Self::Watch { input, source } => write!(f, "cannot watch {input}: {source}"),
            Self::Driver(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for InstallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::DuplicateInput(_) => None,
            Self::Watch { source, .. } => Some(source),
            Self::Driver(e) => Some(e),
        }
    }
}

impl From<DriverError> for InstallError {
    fn from(e: DriverError) -> Self {
        Self::Driver(e)
    }
}

// Field order matters: the subscription is dropped before the driver.
struct InstalledButton {
    watch: WatchHandle,
    rule: String,
    driver: ClassifierDriver,
}

/// A running set of button rules.
#[derive(Default)]
pub struct ButtonSet {
    buttons: Vec<InstalledButton>,
}

impl fmt::Debug for ButtonSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonSet")
            .field("rules", &self.rule_names().collect::<Vec<_>>())
            .finish()
    }
}

impl ButtonSet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `config` and install every button in it.
    ///
    /// `config.debug == true` turns on classification diagnostics for the
    /// process.
    pub fn install<W>(
        watcher: &W,
        registry: &ActionRegistry,
        config: &ControllerConfig,
    ) -> Result<Self, InstallError>
    where
        W: InputWatcher + ?Sized,
    {
        let config = config.clone().validated().map_err(InstallError::Config)?;
        if config.debug {
            set_debug_mode(true);
        }

        let mut set = Self::new();
        for button in &config.buttons {
            set.install_button(watcher, registry, button)?;
        }
        tracing::info!(target: "pressgest.install", buttons = set.len(), "button rules installed");
        Ok(set)
    }

    /// Install one more button.
    pub fn install_button<W>(
        &mut self,
        watcher: &W,
        registry: &ActionRegistry,
        button: &ButtonConfig,
    ) -> Result<(), InstallError>
    where
        W: InputWatcher + ?Sized,
    {
        let input = button.input_id();
        if self.buttons.iter().any(|b| *b.driver.input() == input) {
            return Err(InstallError::DuplicateInput(input));
        }

        let config = gesture_config(&input, registry, button);
        let driver = ClassifierDriver::spawn(GestureClassifier::new(input.clone(), config))?;

        let sender = driver.sender();
        let watch = watcher
            .subscribe(
                &input,
                Box::new(move |pressed| {
                    if let Err(e) = sender.send(pressed) {
                        tracing::warn!(target: "pressgest.install", error = %e, "level change dropped");
                    }
                }),
            )
            .map_err(|source| InstallError::Watch {
                input: input.clone(),
                source,
            })?;

        let rule = input.rule_name();
        tracing::debug!(target: "pressgest.install", rule = %rule, "rule installed");
        self.buttons.push(InstalledButton {
            watch,
            rule,
            driver,
        });
        Ok(())
    }

    /// Names of the installed rules, in installation order.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.buttons.iter().map(|b| b.rule.as_str())
    }

    /// A sender for injecting level changes into `input`'s driver directly.
    #[must_use]
    pub fn sender(&self, input: &InputId) -> Option<LevelSender> {
        self.buttons
            .iter()
            .find(|b| b.driver.input() == input)
            .map(|b| b.driver.sender())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    /// Unsubscribe every rule, then stop and join every driver.
    ///
    /// Gestures still pending (an unfinished press run, a held button) are
    /// dropped without firing.
    pub fn shutdown(self) {
        for InstalledButton { watch, rule, driver } in self.buttons {
            watch.cancel();
            driver.stop();
            tracing::debug!(target: "pressgest.install", rule = %rule, "rule stopped");
        }
    }
}

fn gesture_config(input: &InputId, registry: &ActionRegistry, button: &ButtonConfig) -> GestureConfig {
    let mut config = GestureConfig::new().with_timing(button.timing());
    for (name, spec) in &button.actions {
        let gesture = match name.parse::<Gesture>() {
            Ok(gesture) => gesture,
            Err(e) => {
                diag!(target: "pressgest.install", input = %input, error = %e, "action skipped");
                continue;
            }
        };
        if !ActionTable::accepts(gesture) {
            diag!(
                target: "pressgest.install",
                input = %input,
                gesture = %gesture,
                max_index = MAX_GESTURE_INDEX,
                "action skipped: gesture index out of range"
            );
            continue;
        }
        match registry.resolve(spec) {
            Some(action) => {
                config.actions.insert(gesture, action);
            }
            None => {
                diag!(
                    target: "pressgest.install",
                    input = %input,
                    gesture = %gesture,
                    action_target = %spec.target,
                    "action target not registered"
                );
            }
        }
    }
    config
}
