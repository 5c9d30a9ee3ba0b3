#![forbid(unsafe_code)]

//! Real-time driver for one classifier.
//!
//! A [`ClassifierDriver`] moves a [`GestureClassifier`] onto its own thread.
//! Level changes reach it through a channel; between messages the thread
//! sleeps until the classifier's next timer deadline and then calls
//! [`advance`](GestureClassifier::advance).
//!
//! # How it works
//!
//! 1. Senders stamp each level change with the time it was observed.
//! 2. The loop waits with `recv_timeout(next_deadline - now)`. Queued level
//!    changes are always taken before an expired deadline is serviced.
//! 3. On timeout the loop advances the classifier to `Instant::now()`.
//! 4. A stop message ends the loop; the classifier is dropped with the thread.
//!
//! The driver thread is the only code touching the classifier, so every
//! callback for one input runs serialized.

use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;

use pressgest_core::{Fired, GestureClassifier, InputId};
use web_time::Instant;

/// A level change observed at `at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChange {
    pub pressed: bool,
    pub at: Instant,
}

enum DriverMsg {
    Level(LevelChange),
    Stop,
}

/// Errors from spawning or feeding a driver.
#[derive(Debug)]
pub enum DriverError {
    /// The driver thread could not be started.
    Spawn(std::io::Error),
    /// The driver has stopped; the level change was not delivered.
    Stopped(InputId),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(e) => write!(f, "failed to spawn driver thread: {e}"),
            Self::Stopped(input) => write!(f, "driver for {input} has stopped"),
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(e) => Some(e),
            Self::Stopped(_) => None,
        }
    }
}

/// Cloneable handle that feeds level changes to a driver.
#[derive(Clone)]
pub struct LevelSender {
    input: InputId,
    tx: mpsc::Sender<DriverMsg>,
}

impl fmt::Debug for LevelSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelSender").field("input", &self.input).finish()
    }
}

impl LevelSender {
    /// Deliver a level change observed now.
    pub fn send(&self, pressed: bool) -> Result<(), DriverError> {
        self.send_at(pressed, Instant::now())
    }

    /// Deliver a level change observed at `at`.
    pub fn send_at(&self, pressed: bool, at: Instant) -> Result<(), DriverError> {
        self.tx
            .send(DriverMsg::Level(LevelChange { pressed, at }))
            .map_err(|_| DriverError::Stopped(self.input.clone()))
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &InputId {
        &self.input
    }
}

/// A running classifier thread.
pub struct ClassifierDriver {
    sender: LevelSender,
    thread: Option<thread::JoinHandle<()>>,
}

impl fmt::Debug for ClassifierDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierDriver")
            .field("input", &self.sender.input)
            .field("running", &self.thread.is_some())
            .finish()
    }
}

impl ClassifierDriver {
    /// Start a driver thread owning `classifier`.
    pub fn spawn(classifier: GestureClassifier) -> Result<Self, DriverError> {
        Self::spawn_inner(classifier, None)
    }

    /// Start a driver that also reports every recognized gesture on `observer`.
    pub fn spawn_observed(
        classifier: GestureClassifier,
        observer: mpsc::Sender<(InputId, Fired)>,
    ) -> Result<Self, DriverError> {
        Self::spawn_inner(classifier, Some(observer))
    }

    fn spawn_inner(
        classifier: GestureClassifier,
        observer: Option<mpsc::Sender<(InputId, Fired)>>,
    ) -> Result<Self, DriverError> {
        let input = classifier.input().clone();
        let (tx, rx) = mpsc::channel();

        tracing::debug!(target: "pressgest.driver", input = %input, "starting driver");
        let thread = thread::Builder::new()
            .name(format!("pressgest:{input}"))
            .spawn(move || run(classifier, rx, observer))
            .map_err(DriverError::Spawn)?;

        Ok(Self {
            sender: LevelSender { input, tx },
            thread: Some(thread),
        })
    }

    /// A handle for feeding level changes.
    #[must_use]
    pub fn sender(&self) -> LevelSender {
        self.sender.clone()
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &InputId {
        &self.sender.input
    }

    /// Stop the driver and join its thread.
    ///
    /// Pending timers are dropped without firing.
    pub fn stop(mut self) {
        let _ = self.sender.tx.send(DriverMsg::Stop);
        if let Some(handle) = self.thread.take()
            && handle.join().is_err()
        {
            tracing::error!(target: "pressgest.driver", input = %self.sender.input, "driver thread panicked");
        }
    }
}

impl Drop for ClassifierDriver {
    fn drop(&mut self) {
        // Don't join in drop to avoid blocking
        let _ = self.sender.tx.send(DriverMsg::Stop);
    }
}

fn run(
    mut classifier: GestureClassifier,
    rx: mpsc::Receiver<DriverMsg>,
    observer: Option<mpsc::Sender<(InputId, Fired)>>,
) {
    let report = |input: &InputId, fired: Vec<Fired>| {
        if let Some(observer) = &observer {
            for f in fired {
                let _ = observer.send((input.clone(), f));
            }
        }
    };

    loop {
        let msg = match classifier.next_deadline() {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(Instant::now());
                match rx.recv_timeout(wait) {
                    Ok(msg) => msg,
                    Err(RecvTimeoutError::Timeout) => {
                        let fired = classifier.advance(Instant::now());
                        report(classifier.input(), fired);
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match rx.recv() {
                Ok(msg) => msg,
                Err(_) => break,
            },
        };

        match msg {
            DriverMsg::Level(change) => {
                let fired = classifier.on_level_change(change.pressed, change.at);
                report(classifier.input(), fired);
            }
            DriverMsg::Stop => break,
        }
    }

    tracing::debug!(target: "pressgest.driver", input = %classifier.input(), "driver stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressgest_core::{Action, ActionArg, Gesture, GestureConfig, TimingConfig};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(2);

    fn fast_timing() -> TimingConfig {
        TimingConfig::from_millis(40, 150, 30)
    }

    fn recording(label: &'static str, calls: &Arc<Mutex<Vec<&'static str>>>) -> Action {
        let calls = calls.clone();
        Action::from_fn(move |_: &[ActionArg]| calls.lock().unwrap().push(label), Vec::new())
    }

    #[test]
    fn single_press_in_real_time() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let config = GestureConfig::new()
            .with_timing(fast_timing())
            .with_action(Gesture::Press(1), recording("single", &calls));
        let (obs_tx, obs_rx) = mpsc::channel();
        let driver =
            ClassifierDriver::spawn_observed(GestureClassifier::new("dev/btn", config), obs_tx)
                .unwrap();

        let sender = driver.sender();
        sender.send(true).unwrap();
        sender.send(false).unwrap();

        let (input, fired) = obs_rx.recv_timeout(WAIT).unwrap();
        assert_eq!(input.as_str(), "dev/btn");
        assert_eq!(fired.gesture, Gesture::Press(1));
        assert!(fired.dispatched);

        driver.stop();
        assert_eq!(*calls.lock().unwrap(), vec!["single"]);
    }

    #[test]
    fn long_press_repeats_then_releases() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let config = GestureConfig::new()
            .with_timing(fast_timing())
            .with_action(Gesture::LongPress(0), recording("long", &calls))
            .with_action(Gesture::LongRelease(0), recording("release", &calls));
        let (obs_tx, obs_rx) = mpsc::channel();
        let driver =
            ClassifierDriver::spawn_observed(GestureClassifier::new("dev/btn", config), obs_tx)
                .unwrap();

        let sender = driver.sender();
        sender.send(true).unwrap();

        // Threshold crossing plus at least one repeat.
        for _ in 0..2 {
            let (_, fired) = obs_rx.recv_timeout(WAIT).unwrap();
            assert_eq!(fired.gesture, Gesture::LongPress(0));
        }

        sender.send(false).unwrap();
        let release = loop {
            let (_, fired) = obs_rx.recv_timeout(WAIT).unwrap();
            if fired.gesture != Gesture::LongPress(0) {
                break fired;
            }
        };
        assert_eq!(release.gesture, Gesture::LongRelease(0));

        // No repeat after release.
        assert!(obs_rx.recv_timeout(Duration::from_millis(120)).is_err());
        driver.stop();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.last(), Some(&"release"));
        assert_eq!(calls.iter().filter(|c| **c == "release").count(), 1);
    }

    #[test]
    fn explicit_timestamps_are_honoured() {
        let (obs_tx, obs_rx) = mpsc::channel();
        let driver = ClassifierDriver::spawn_observed(
            GestureClassifier::new("dev/btn", GestureConfig::new().with_timing(fast_timing())),
            obs_tx,
        )
        .unwrap();

        // Both edges stamped in the past: the run finalizes 40ms after the release stamp.
        let t = Instant::now();
        let sender = driver.sender();
        sender.send_at(true, t).unwrap();
        sender.send_at(false, t + Duration::from_millis(10)).unwrap();

        let (_, fired) = obs_rx.recv_timeout(WAIT).unwrap();
        assert_eq!(fired.gesture, Gesture::Press(1));
        assert_eq!(fired.at, t + Duration::from_millis(50));
        assert!(!fired.dispatched);
        driver.stop();
    }

    #[test]
    fn send_after_stop_fails() {
        let driver = ClassifierDriver::spawn(GestureClassifier::new("dev/btn", GestureConfig::new()))
            .unwrap();
        let sender = driver.sender();
        driver.stop();

        let err = sender.send(true).unwrap_err();
        assert!(matches!(err, DriverError::Stopped(ref input) if input.as_str() == "dev/btn"));
        assert_eq!(err.to_string(), "driver for dev/btn has stopped");
    }

    #[test]
    fn stop_drops_pending_timers() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let config = GestureConfig::new()
            .with_timing(fast_timing())
            .with_action(Gesture::Press(1), recording("single", &calls));
        let driver = ClassifierDriver::spawn(GestureClassifier::new("dev/btn", config)).unwrap();

        let sender = driver.sender();
        sender.send(true).unwrap();
        sender.send(false).unwrap();
        driver.stop();

        std::thread::sleep(Duration::from_millis(100));
        assert!(calls.lock().unwrap().is_empty());
    }
}
