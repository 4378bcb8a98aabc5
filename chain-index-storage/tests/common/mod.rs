//! Shared test fixture: makes the crate's `tracing::debug!`/`warn!`
//! events (busy/locked retries, deferred-index warnings, migration
//! progress) visible under `cargo test -- --nocapture`, the way
//! `drift-core`'s own `init_tracing` wires a subscriber once per process.

use std::sync::Once;

static INIT: Once = Once::new();

/// Install a process-wide `fmt` subscriber, once. Safe to call from every
/// test that wants to observe tracing output; later calls are no-ops.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}
