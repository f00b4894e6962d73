//! Tracing subscriber setup

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured filter. Fails instead of panicking
/// when a subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .with_context(|| format!("Invalid log filter: {}", config.filter))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };
    installed.context("Failed to install tracing subscriber")
}
