#![forbid(unsafe_code)]

//! Named action targets.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use pressgest_core::{Action, ActionArg, Invocable};

use crate::config::ActionSpec;

/// Maps target names used in configuration to invocable targets.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    targets: BTreeMap<String, Arc<dyn Invocable>>,
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("targets", &self.targets.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ActionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target` under `name`, returning the target it replaced.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        target: Arc<dyn Invocable>,
    ) -> Option<Arc<dyn Invocable>> {
        self.targets.insert(name.into(), target)
    }

    /// Register a closure under `name`.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F) -> Option<Arc<dyn Invocable>>
    where
        F: Fn(&[ActionArg]) + Send + Sync + 'static,
    {
        self.register(name, Arc::new(f))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Invocable>> {
        self.targets.get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }

    /// Bind `args` to the target registered as `name`.
    ///
    /// Returns `None` (and logs a warning) when nothing is registered under
    /// that name.
    #[must_use]
    pub fn bind(&self, name: &str, args: Vec<ActionArg>) -> Option<Action> {
        match self.get(name) {
            Some(target) => Some(Action::new(target, args)),
            None => {
                tracing::warn!(target: "pressgest.action", name, "no action registered under this name");
                None
            }
        }
    }

    /// Bind a configured action to its registered target.
    #[must_use]
    pub fn resolve(&self, spec: &ActionSpec) -> Option<Action> {
        self.bind(&spec.target, spec.args.clone())
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.targets.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
