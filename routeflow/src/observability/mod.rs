//! Observability utilities.

mod trace;

pub use trace::{
    json_snapshot, to_debug_string, RunSpan, SnapshotFn, SpanTimer, SNAPSHOT_DISABLED,
};

use tracing_subscriber::EnvFilter;

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over `default_directive`. Returns false if a
/// global subscriber was already set.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
