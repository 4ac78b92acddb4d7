//! `tracing` subscriber setup for the binaries.

use tracing_subscriber::EnvFilter;

/// Installs a formatted subscriber filtered by `filter` (`RUST_LOG` syntax).
///
/// `RUST_LOG`, when set, wins over `filter`. Calling this twice is harmless:
/// the second installation attempt is ignored.
pub fn init_tracing(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}
