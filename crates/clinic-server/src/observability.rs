//! Tracing setup. The level comes from `RUST_LOG` when set, otherwise
//! from configuration, and can be swapped at runtime through a reload
//! handle once the configured level is known.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type FilterHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

static LOG_RELOAD_HANDLE: OnceLock<FilterHandle> = OnceLock::new();

/// Installs the global subscriber with the default `info` level.
/// Called before configuration is loaded; the configured level is
/// applied afterwards via [`apply_logging_level`].
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (filter_layer, handle) = reload::Layer::new(filter);
    let _ = LOG_RELOAD_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer())
        .try_init();
}

/// Swaps the active filter. A `RUST_LOG` set in the environment wins
/// over the configured level.
pub fn apply_logging_level(level: &str) {
    if std::env::var("RUST_LOG").is_ok() {
        return;
    }
    if let Some(handle) = LOG_RELOAD_HANDLE.get() {
        let _ = handle.modify(|filter| *filter = EnvFilter::new(level));
    }
}

pub fn shutdown_tracing() {
    // The fmt layer flushes on drop; nothing else to tear down.
}
