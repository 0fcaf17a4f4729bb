//! Tracing subscriber setup

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Installs the global subscriber.
///
/// Filter precedence: `verbose` (debug), then `RUST_LOG`, then the
/// configured level.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(config, verbose)?)
        .with_target(true);

    let result = match config.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };

    result.map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}

fn build_filter(config: &LoggingConfig, verbose: bool) -> Result<EnvFilter> {
    if verbose {
        return Ok(EnvFilter::new("debug"));
    }

    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| anyhow!("Invalid log filter '{}': {e}", config.level))
}
