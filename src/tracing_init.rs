//! Tracing initialization for tests and binaries
//!
//! The numerical core never logs. The driver loop and `LogSink` do, filtered by `RUST_LOG`:
//! - `RUST_LOG=rustydoa=debug` - per-pair max-bin comparison
//! - `RUST_LOG=rustydoa::driver=trace` - every pair handed to the accumulator

#[cfg(test)]
use once_cell::sync::Lazy;

/// Initialize tracing for unit tests with environment-based filtering
///
/// Safe to call from every test; only the first call installs the subscriber.
/// Integration tests use the copy in `tests/test_utils.rs`.
#[cfg(test)]
pub fn init_test_tracing() {
    static TRACING: Lazy<()> = Lazy::new(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("rustydoa=warn"));

        // Another harness may already own the global subscriber
        let _ = fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_line_number(true)
            .with_test_writer()
            .try_init();
    });

    Lazy::force(&TRACING);
}

/// Initialize tracing for binaries with environment-based filtering
///
/// Call this early in main().
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rustydoa=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}
