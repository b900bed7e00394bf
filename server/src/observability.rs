//! Tracing subscriber initialization.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LogFormat};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "home21_server=info";

/// Install the global `tracing` subscriber.
///
/// Call once from `main`, after the environment has been loaded. Fails if a
/// global subscriber is already installed.
pub fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match config.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    installed.map_err(|e| anyhow!(e))
}
