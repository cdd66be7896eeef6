//! Tracing setup for binaries built on the engine.
//!
//! Libraries in this workspace only emit `tracing` events; installing a
//! subscriber is the binary's call.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`].
///
/// Safe to call more than once; later calls leave the first subscriber
/// in place.
pub fn init() {
    init_with(DEFAULT_FILTER);
}

/// Like [`init`] with a caller-chosen fallback filter, e.g.
/// `"info,tombola_room=debug"`.
pub fn init_with(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok() {
        tracing::debug!("tracing initialized");
    }
}
