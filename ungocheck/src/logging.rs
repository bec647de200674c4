//! Diagnostics for the adapter itself.
//!
//! `go test` output is forwarded on stdout untouched, so every tracing event
//! is written to stderr instead.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or unparseable.
const DEFAULT_FILTER: &str = "warn";

/// Install the stderr subscriber.
///
/// `RUST_LOG=ungocheck=debug ungocheck -v ./...` shows each stage, the
/// resolved file count and the shadow files written and removed.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry().with(filter).with(stderr).init();
}
