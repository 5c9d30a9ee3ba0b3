//! Property-based invariant tests for the gesture classifier.
//!
//! 1. A run of N quick clicks fires exactly `Press(N)`, once, 300ms after the
//!    last release
//! 2. A hold after K clicks fires `LongPress(K)` at the threshold, repeats every
//!    interval up to the release, then `LongRelease(K)` exactly once
//! 3. Without a release action a hold fires exactly one `LongPress`
//! 4. Arbitrary level streams: timestamps are ordered and never in the future,
//!    and the machine always returns to idle
//! 5. Nothing fires after `reset()`

use pressgest_core::{
    Action, ActionArg, Fired, Gesture, GestureClassifier, GestureConfig, LongPressEpisode,
};
use proptest::prelude::*;
use web_time::{Duration, Instant};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn noop() -> Action {
    Action::from_fn(|_: &[ActionArg]| {}, Vec::new())
}

fn full_config(max: u32) -> GestureConfig {
    let mut config = GestureConfig::new();
    for n in 1..=max {
        config = config.with_action(Gesture::Press(n), noop());
    }
    for k in 0..=max {
        config = config
            .with_action(Gesture::LongPress(k), noop())
            .with_action(Gesture::LongRelease(k), noop());
    }
    config
}

/// Drive clicks given as (gap before press, hold) pairs; returns fired
/// gestures and the offset of the last release.
fn drive(gc: &mut GestureClassifier, t: Instant, clicks: &[(u64, u64)]) -> (Vec<Fired>, u64) {
    let mut now = 0;
    let mut fired = Vec::new();
    for &(gap, hold) in clicks {
        now += gap;
        fired.extend(gc.on_level_change(true, t + ms(now)));
        now += hold;
        fired.extend(gc.on_level_change(false, t + ms(now)));
    }
    (fired, now)
}

fn quick_clicks() -> impl Strategy<Value = Vec<(u64, u64)>> {
    prop::collection::vec((1u64..=150, 1u64..=100), 1..8)
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Short-press runs
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn quick_run_fires_press_count_once(clicks in quick_clicks()) {
        let mut gc = GestureClassifier::new("dev/btn", full_config(8));
        let t = Instant::now();

        let (fired, last_release) = drive(&mut gc, t, &clicks);
        prop_assert!(fired.is_empty());

        let fired = gc.advance(t + ms(last_release + 10_000));
        prop_assert_eq!(fired.len(), 1);
        let n = u32::try_from(clicks.len()).unwrap();
        prop_assert_eq!(fired[0].gesture, Gesture::Press(n));
        prop_assert_eq!(fired[0].at, t + ms(last_release + 300));
        prop_assert!(fired[0].dispatched);
        prop_assert_eq!(gc.short_press_count(), 0);
    }

    #[test]
    fn run_beyond_table_resets_silently(extra in 1usize..5) {
        let mut gc = GestureClassifier::new("dev/btn", full_config(2));
        let t = Instant::now();
        let clicks = vec![(50u64, 30u64); 2 + extra];

        let (_, last_release) = drive(&mut gc, t, &clicks);
        let fired = gc.advance(t + ms(last_release + 1000));
        prop_assert_eq!(fired.len(), 1);
        prop_assert!(!fired[0].dispatched);
        prop_assert_eq!(gc.short_press_count(), 0);
        prop_assert_eq!(gc.next_deadline(), None);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2-3. Long presses
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn hold_repeats_until_release(
        prefix in prop::collection::vec((1u64..=150, 1u64..=100), 0..4),
        gap in 1u64..=150,
        hold in 1000u64..3000,
    ) {
        let mut gc = GestureClassifier::new("dev/btn", full_config(8));
        let t = Instant::now();

        let mut clicks = prefix.clone();
        clicks.push((gap, hold));
        let (fired, release) = drive(&mut gc, t, &clicks);
        let press = release - hold;
        let k = u32::try_from(prefix.len()).unwrap();

        let ticks = (hold - 1000) / 100 + 1;
        prop_assert_eq!(fired.len() as u64, ticks + 1);
        for (i, f) in fired.iter().take(ticks as usize).enumerate() {
            prop_assert_eq!(f.gesture, Gesture::LongPress(k));
            prop_assert_eq!(f.at, t + ms(press + 1000 + 100 * i as u64));
        }
        let last = fired.last().unwrap();
        prop_assert_eq!(last.gesture, Gesture::LongRelease(k));
        prop_assert_eq!(last.at, t + ms(release));

        prop_assert!(gc.advance(t + ms(release + 60_000)).is_empty());
        prop_assert_eq!(gc.episode(), LongPressEpisode::Inactive);
    }

    #[test]
    fn hold_without_release_action_fires_once(hold in 1000u64..20_000) {
        let config = GestureConfig::new().with_action(Gesture::LongPress(0), noop());
        let mut gc = GestureClassifier::new("dev/btn", config);
        let t = Instant::now();

        let (fired, _) = drive(&mut gc, t, &[(0, hold)]);
        let long: Vec<_> = fired
            .iter()
            .filter(|f| f.gesture == Gesture::LongPress(0))
            .collect();
        prop_assert_eq!(long.len(), 1);
        prop_assert_eq!(long[0].at, t + ms(1000));
        prop_assert!(fired.iter().all(|f| f.gesture != Gesture::LongRelease(0) || !f.dispatched));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4-5. Arbitrary streams
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn arbitrary_stream_is_ordered_and_settles(
        clicks in prop::collection::vec((0u64..1500, 0u64..2500), 0..30),
    ) {
        let mut gc = GestureClassifier::new("dev/btn", full_config(4));
        let t = Instant::now();

        let mut now = 0;
        let mut fired = Vec::new();
        for &(gap, hold) in &clicks {
            now += gap;
            let stamp = t + ms(now);
            for f in gc.on_level_change(true, stamp) {
                prop_assert!(f.at <= stamp);
                fired.push(f);
            }
            now += hold;
            let stamp = t + ms(now);
            for f in gc.on_level_change(false, stamp) {
                prop_assert!(f.at <= stamp);
                fired.push(f);
            }
        }
        fired.extend(gc.advance(t + ms(now + 60_000)));

        prop_assert!(fired.windows(2).all(|w| w[0].at <= w[1].at));

        // Each episode is a contiguous block of LongPress(k) closed by one release.
        let releases = fired
            .iter()
            .filter(|f| matches!(f.gesture, Gesture::LongRelease(_)))
            .count();
        let episodes = fired
            .iter()
            .enumerate()
            .filter(|(i, f)| {
                matches!(f.gesture, Gesture::LongPress(_))
                    && (*i == 0 || fired[*i - 1].gesture != f.gesture)
            })
            .count();
        prop_assert_eq!(releases, episodes);

        prop_assert_eq!(gc.next_deadline(), None);
        prop_assert_eq!(gc.short_press_count(), 0);
        prop_assert_eq!(gc.episode(), LongPressEpisode::Inactive);
    }

    #[test]
    fn reset_silences_pending_timers(
        clicks in prop::collection::vec((1u64..400, 1u64..1500), 1..10),
    ) {
        let mut gc = GestureClassifier::new("dev/btn", full_config(4));
        let t = Instant::now();

        let (_, end) = drive(&mut gc, t, &clicks);
        gc.on_level_change(true, t + ms(end + 10));
        gc.reset();

        prop_assert_eq!(gc.next_deadline(), None);
        prop_assert!(gc.advance(t + ms(end + 60_000)).is_empty());
    }
}
