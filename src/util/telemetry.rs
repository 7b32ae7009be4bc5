//! Telemetry helpers for structured logging and tracing.

/// Initialize tracing for the runtime.
///
/// Installs an env-filtered fmt subscriber, defaulting to `info` when
/// `RUST_LOG` is unset. Does nothing if the caller (or a test harness) has
/// already installed a subscriber.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
