//! Tracing/logging setup shared by the binaries.

use tracing_subscriber::EnvFilter;

/// Initialize process-wide logging with the default (`info`) filter.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    init_with_filter("info");
}

/// Initialize logging with an explicit fallback filter (`RUST_LOG` still
/// takes precedence when set).
pub fn init_with_filter(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // JSON logs + timestamps, configurable via RUST_LOG.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
