#![forbid(unsafe_code)]

//! Actions bound to gestures.
//!
//! An [`Action`] pairs an [`Invocable`] target with an ordered list of bound
//! [`ActionArg`]s. An [`ActionTable`] stores actions in three ladders indexed
//! by the gesture's index, so adding a quadruple press or a
//! triple-short-long press means filling a slot, not adding a branch.
//!
//! # Failure Modes
//!
//! - Looking up an unconfigured gesture yields `None` and dispatch is a no-op.
//! - A target that panics is contained: the panic is logged at `error` and the
//!   caller sees a normal return.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::kind::Gesture;

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// A bound argument passed to an action target.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ActionArg {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ActionArg {
    /// The string payload, if this is a string argument.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ActionArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for ActionArg {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ActionArg {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ActionArg {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ActionArg {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for ActionArg {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

// ---------------------------------------------------------------------------
// Invocable
// ---------------------------------------------------------------------------

/// Something that performs a side effect when a gesture fires.
///
/// The return value of the side effect is not observed.
pub trait Invocable: Send + Sync {
    /// Perform the side effect with the bound arguments.
    fn invoke(&self, args: &[ActionArg]);
}

impl<F> Invocable for F
where
    F: Fn(&[ActionArg]) + Send + Sync,
{
    fn invoke(&self, args: &[ActionArg]) {
        self(args);
    }
}

/// A target plus its bound arguments.
#[derive(Clone)]
pub struct Action {
    target: Arc<dyn Invocable>,
    args: Vec<ActionArg>,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").field("args", &self.args).finish()
    }
}

impl Action {
    /// Bind `args` to a shared target.
    #[must_use]
    pub fn new(target: Arc<dyn Invocable>, args: Vec<ActionArg>) -> Self {
        Self { target, args }
    }

    /// Bind `args` to a closure.
    #[must_use]
    pub fn from_fn<F>(f: F, args: Vec<ActionArg>) -> Self
    where
        F: Fn(&[ActionArg]) + Send + Sync + 'static,
    {
        Self::new(Arc::new(f), args)
    }

    /// The bound arguments.
    #[inline]
    #[must_use]
    pub fn args(&self) -> &[ActionArg] {
        &self.args
    }

    /// Invoke the target with the bound arguments.
    ///
    /// Returns `false` if the target panicked.
    pub fn invoke(&self) -> bool {
        panic::catch_unwind(AssertUnwindSafe(|| self.target.invoke(&self.args))).is_ok()
    }
}

// ---------------------------------------------------------------------------
// ActionTable
// ---------------------------------------------------------------------------

/// Highest press count or compound index an [`ActionTable`] can bind.
///
/// Gestures above it parse as names but are never bound, so a configuration
/// key such as `press4294967295` costs nothing.
pub const MAX_GESTURE_INDEX: u32 = 64;

/// Gesture → action lookup, stored as index-addressed ladders.
///
/// `press[n - 1]` holds the action for `Press(n)`; `long_press[k]` and
/// `long_release[k]` hold the actions for compound index `k`. Indices above
/// [`MAX_GESTURE_INDEX`] are rejected.
#[derive(Debug, Clone, Default)]
pub struct ActionTable {
    press: Vec<Option<Action>>,
    long_press: Vec<Option<Action>>,
    long_release: Vec<Option<Action>>,
}

impl ActionTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `gesture` has a slot in the table.
    #[inline]
    #[must_use]
    pub fn accepts(gesture: Gesture) -> bool {
        Self::slot(gesture).is_some()
    }

    fn slot(gesture: Gesture) -> Option<usize> {
        if gesture.index() > MAX_GESTURE_INDEX {
            return None;
        }
        let idx = match gesture {
            Gesture::Press(n) => n.checked_sub(1)?,
            Gesture::LongPress(k) | Gesture::LongRelease(k) => k,
        };
        usize::try_from(idx).ok()
    }

    fn ladder(&self, gesture: Gesture) -> &[Option<Action>] {
        match gesture {
            Gesture::Press(_) => &self.press,
            Gesture::LongPress(_) => &self.long_press,
            Gesture::LongRelease(_) => &self.long_release,
        }
    }

    fn ladder_mut(&mut self, gesture: Gesture) -> &mut Vec<Option<Action>> {
        match gesture {
            Gesture::Press(_) => &mut self.press,
            Gesture::LongPress(_) => &mut self.long_press,
            Gesture::LongRelease(_) => &mut self.long_release,
        }
    }

    /// Bind `action` to `gesture`, returning the action it replaced.
    ///
    /// `Press(0)` names nothing and is ignored, as is any gesture whose index
    /// exceeds [`MAX_GESTURE_INDEX`].
    pub fn insert(&mut self, gesture: Gesture, action: Action) -> Option<Action> {
        let idx = Self::slot(gesture)?;
        let ladder = self.ladder_mut(gesture);
        if ladder.len() <= idx {
            ladder.resize_with(idx + 1, || None);
        }
        ladder.get_mut(idx).and_then(|slot| slot.replace(action))
    }

    /// Bind `action` to the gesture called `name`.
    ///
    /// Returns `false` and stores nothing when `name` is not a gesture name
    /// or its index is out of range.
    pub fn insert_named(&mut self, name: &str, action: Action) -> bool {
        match name.parse::<Gesture>() {
            Ok(gesture) if Self::accepts(gesture) => {
                self.insert(gesture, action);
                true
            }
            _ => false,
        }
    }

    /// Remove the action bound to `gesture`.
    pub fn remove(&mut self, gesture: Gesture) -> Option<Action> {
        let idx = Self::slot(gesture)?;
        self.ladder_mut(gesture).get_mut(idx).and_then(Option::take)
    }

    /// The action bound to `gesture`, if any.
    #[must_use]
    pub fn get(&self, gesture: Gesture) -> Option<&Action> {
        let idx = Self::slot(gesture)?;
        self.ladder(gesture).get(idx).and_then(Option::as_ref)
    }

    /// Whether `gesture` has an action.
    #[inline]
    #[must_use]
    pub fn contains(&self, gesture: Gesture) -> bool {
        self.get(gesture).is_some()
    }

    /// Whether the long press with compound index `k` has a release action.
    #[inline]
    #[must_use]
    pub fn has_release(&self, k: u32) -> bool {
        self.contains(Gesture::LongRelease(k))
    }

    /// Number of bound gestures.
    #[must_use]
    pub fn len(&self) -> usize {
        [&self.press, &self.long_press, &self.long_release]
            .iter()
            .map(|ladder| ladder.iter().filter(|slot| slot.is_some()).count())
            .sum()
    }

    /// Whether no gesture is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All bound gestures, press ladder first.
    pub fn gestures(&self) -> impl Iterator<Item = Gesture> + '_ {
        let press = self
            .press
            .iter()
            .zip(1u32..)
            .filter(|(slot, _)| slot.is_some())
            .map(|(_, n)| Gesture::Press(n));
        let long = self
            .long_press
            .iter()
            .zip(0u32..)
            .filter(|(slot, _)| slot.is_some())
            .map(|(_, k)| Gesture::LongPress(k));
        let release = self
            .long_release
            .iter()
            .zip(0u32..)
            .filter(|(slot, _)| slot.is_some())
            .map(|(_, k)| Gesture::LongRelease(k));
        press.chain(long).chain(release)
    }

    /// Invoke the action bound to `gesture`.
    ///
    /// Returns `true` if an action was bound, whether or not it panicked.
    pub fn dispatch(&self, gesture: Gesture) -> bool {
        let Some(action) = self.get(gesture) else {
            return false;
        };
        if !action.invoke() {
            tracing::error!(
                target: "pressgest.action",
                gesture = %gesture,
                "action panicked; gesture consumed"
            );
        }
        true
    }
}
