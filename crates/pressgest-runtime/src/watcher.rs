#![forbid(unsafe_code)]

//! Input level subscriptions.
//!
//! [`InputWatcher`] is the capability the runtime needs from whatever owns the
//! inputs: deliver every level change of one input to a callback until the
//! returned [`WatchHandle`] is dropped. [`LocalWatcher`] is an in-process
//! implementation used by hosts that read inputs themselves and by tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use pressgest_core::InputId;

/// Callback invoked with the new level (`true` = pressed).
pub type LevelCallback = Box<dyn Fn(bool) + Send + Sync>;

/// Something that can deliver level changes for named inputs.
pub trait InputWatcher {
    /// Call `callback` on every level change of `input` until the handle is
    /// dropped.
    fn subscribe(&self, input: &InputId, callback: LevelCallback)
    -> Result<WatchHandle, WatchError>;
}

/// Errors from [`InputWatcher::subscribe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    /// The watcher does not know this input.
    UnknownInput(InputId),
    /// The watcher cannot accept subscriptions.
    Unavailable(String),
}

impl fmt::Display for WatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownInput(input) => write!(f, "unknown input: {input}"),
            Self::Unavailable(reason) => write!(f, "watcher unavailable: {reason}"),
        }
    }
}

impl std::error::Error for WatchError {}

/// Keeps a subscription alive. Dropping it unsubscribes.
pub struct WatchHandle {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

impl WatchHandle {
    /// A handle that runs `unsubscribe` once, on [`cancel`](Self::cancel) or drop.
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// A handle with nothing to undo.
    #[must_use]
    pub fn detached() -> Self {
        Self { unsubscribe: None }
    }

    /// Unsubscribe now.
    pub fn cancel(mut self) {
        self.run_unsubscribe();
    }

    fn run_unsubscribe(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.run_unsubscribe();
    }
}

// ---------------------------------------------------------------------------
// LocalWatcher
// ---------------------------------------------------------------------------

type SharedCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Delivery order for one input: tickets are issued in the order levels are
/// recorded and served one at a time.
#[derive(Default)]
struct Lane {
    issued: u64,
    serving: u64,
}

#[derive(Default)]
struct WatchState {
    next_id: u64,
    subscriptions: BTreeMap<InputId, Vec<(u64, SharedCallback)>>,
    levels: HashMap<InputId, bool>,
    lanes: HashMap<InputId, Lane>,
    known: Option<HashSet<InputId>>,
}

#[derive(Default)]
struct Shared {
    state: Mutex<WatchState>,
    turn: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, WatchState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Hands the lane to the next ticket when delivery ends, even by unwinding.
struct Turn<'a> {
    shared: &'a Shared,
    input: &'a InputId,
}

impl Drop for Turn<'_> {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        if let Some(lane) = state.lanes.get_mut(self.input) {
            lane.serving += 1;
        }
        self.shared.turn.notify_all();
    }
}

/// In-process [`InputWatcher`].
///
/// [`publish`](Self::publish) records the level of an input and, when it
/// differs from the last published level, calls every subscriber of that
/// input in subscription order. Repeated identical levels are swallowed.
///
/// Subscribers see the levels of one input in the order they were recorded,
/// even with several publishing threads. A callback may publish to other
/// inputs but must not publish to the input it is being called for.
#[derive(Clone, Default)]
pub struct LocalWatcher {
    shared: Arc<Shared>,
}

impl fmt::Debug for LocalWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("LocalWatcher")
            .field("inputs", &state.subscriptions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl LocalWatcher {
    /// A watcher that accepts subscriptions for any input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A watcher that only knows `inputs`; subscribing to anything else fails
    /// with [`WatchError::UnknownInput`].
    pub fn with_inputs<I>(inputs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<InputId>,
    {
        let state = WatchState {
            known: Some(inputs.into_iter().map(Into::into).collect()),
            ..WatchState::default()
        };
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                turn: Condvar::new(),
            }),
        }
    }

    /// Publish a level for `input`. Returns the number of callbacks called.
    ///
    /// Blocks while an earlier level of the same input is still being
    /// delivered.
    pub fn publish(&self, input: &InputId, pressed: bool) -> usize {
        let shared = &*self.shared;
        let mut state = shared.lock();
        if state.levels.insert(input.clone(), pressed) == Some(pressed) {
            return 0;
        }
        let callbacks: Vec<SharedCallback> = state
            .subscriptions
            .get(input)
            .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default();

        let lane = state.lanes.entry(input.clone()).or_default();
        let ticket = lane.issued;
        lane.issued += 1;
        while state.lanes.get(input).is_some_and(|lane| lane.serving != ticket) {
            state = shared.turn.wait(state).unwrap_or_else(|e| e.into_inner());
        }
        drop(state);
        let _turn = Turn { shared, input };

        tracing::trace!(
            target: "pressgest.watch",
            input = %input,
            pressed,
            subscribers = callbacks.len(),
            "level published"
        );
        for cb in &callbacks {
            cb(pressed);
        }
        callbacks.len()
    }

    /// Last published level of `input`.
    #[must_use]
    pub fn level(&self, input: &InputId) -> Option<bool> {
        let state = self.shared.lock();
        state.levels.get(input).copied()
    }

    /// Number of live subscriptions for `input`.
    #[must_use]
    pub fn subscriber_count(&self, input: &InputId) -> usize {
        let state = self.shared.lock();
        state.subscriptions.get(input).map_or(0, Vec::len)
    }
}

impl InputWatcher for LocalWatcher {
    fn subscribe(
        &self,
        input: &InputId,
        callback: LevelCallback,
    ) -> Result<WatchHandle, WatchError> {
        let id = {
            let mut state = self.shared.lock();
            if let Some(known) = &state.known
                && !known.contains(input)
            {
                return Err(WatchError::UnknownInput(input.clone()));
            }
            let id = state.next_id;
            state.next_id += 1;
            state
                .subscriptions
                .entry(input.clone())
                .or_default()
                .push((id, Arc::from(callback)));
            id
        };
        tracing::debug!(target: "pressgest.watch", input = %input, id, "subscribed");

        let shared = Arc::clone(&self.shared);
        let input = input.clone();
        Ok(WatchHandle::new(move || {
            let mut state = shared.lock();
            if let Some(subs) = state.subscriptions.get_mut(&input) {
                subs.retain(|(sub_id, _)| *sub_id != id);
                if subs.is_empty() {
                    state.subscriptions.remove(&input);
                }
            }
            tracing::debug!(target: "pressgest.watch", input = %input, id, "unsubscribed");
        }))
    }
}
