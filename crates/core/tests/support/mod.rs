//! Shared test helpers for `datasync-core` integration tests.
//!
//! Provides an in-memory Datasets Service so synchronizer tests can focus on
//! behaviour instead of HTTP plumbing.

pub mod datasets;

/// Install a test subscriber once so `tracing` output shows up in failures.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}
