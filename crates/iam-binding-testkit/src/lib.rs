//! # IAM Binding Testkit
//!
//! Test infrastructure for the reconciliation crates: an in-memory policy
//! authority with real etag compare-and-swap semantics and failure
//! injection, plus tracing setup for tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// In-memory policy authority, updater and factory
pub mod authority;

pub use authority::{InMemoryAuthority, InMemoryFactory, InMemoryUpdater};

use tracing_subscriber::EnvFilter;

/// Install a test-friendly tracing subscriber, honoring `RUST_LOG`
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
