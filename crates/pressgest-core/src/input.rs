#![forbid(unsafe_code)]

//! Input identifiers.

use std::fmt;

/// Name of a monitored input, conventionally `"<device>/<control>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputId(String);

impl InputId {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the rule that watches this input: `on_button_press_<device>_<control>`.
    #[must_use]
    pub fn rule_name(&self) -> String {
        format!("on_button_press_{}", self.0.replace('/', "_"))
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InputId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for InputId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for InputId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
