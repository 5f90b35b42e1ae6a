//! Logging initialization

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber
///
/// Honours `RUST_LOG`; defaults to `info` for everything.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
