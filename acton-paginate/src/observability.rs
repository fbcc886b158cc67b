//! Structured logging setup

use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::Result};

/// Install a JSON tracing subscriber on stderr filtered by `service.log_level`
///
/// An unparsable level falls back to `info`. Calling this more than once is
/// harmless: later calls leave the existing subscriber in place and say so at
/// debug level.
pub fn init_tracing(config: &Config) -> Result<()> {
    let log_level = config.service.log_level.clone();

    let installed = tracing_subscriber::fmt()
        .json()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Tracing initialized for service: {}", config.service.name);
    } else {
        tracing::debug!(
            service = %config.service.name,
            "Tracing subscriber already installed, keeping it"
        );
    }

    Ok(())
}
