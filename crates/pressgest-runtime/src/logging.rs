#![forbid(unsafe_code)]

//! Subscriber setup for hosts.
//!
//! The library only emits `tracing` events. Targets:
//!
//! | target | level | content |
//! |---|---|---|
//! | `pressgest.gesture` | debug | classification steps (only in debug mode) |
//! | `pressgest.action` | error / warn | panicking or unregistered targets |
//! | `pressgest.driver` | debug / error | driver start, stop, thread panic |
//! | `pressgest.watch` | debug / trace | subscriptions and published levels |
//! | `pressgest.install` | info / debug | installed rules and skipped actions |
//!
//! Hosts that already install a subscriber need nothing from here. With the
//! `subscriber` feature, [`install_subscriber`] sets up a `fmt` subscriber on
//! stderr filtered by `RUST_LOG`, falling back to [`default_filter`].

/// Filter used when `RUST_LOG` is unset.
///
/// Classification diagnostics are `debug` events, so they are only let
/// through when `debug` is set.
#[must_use]
pub fn default_filter(debug: bool) -> &'static str {
    if debug { "info,pressgest=debug" } else { "info" }
}

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` wins over `fallback_filter` when set. Fails if a global
/// subscriber is already installed.
#[cfg(feature = "subscriber")]
pub fn install_subscriber(
    fallback_filter: &str,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
}
