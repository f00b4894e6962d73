//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use crate::config::StashConfig;
use anyhow::{Context, Result};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

fn defaults() -> ConfigBuilder<config::builder::DefaultState> {
    Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
}

/// Load configuration from files and environment
///
/// Sources, lowest priority first: embedded defaults, `config/keystash`,
/// `config/local`, `.env`-populated and process `KEYSTASH_*` variables.
pub fn load_config() -> Result<StashConfig> {
    let _ = dotenvy::dotenv();

    let config = defaults()
        .add_source(File::with_name("config/keystash").required(false))
        .add_source(File::with_name("config/local").required(false))
        // KEYSTASH_STORE__BACKEND=memory -> store.backend
        .add_source(
            Environment::with_prefix("KEYSTASH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Load configuration from a TOML string layered over the embedded defaults
pub fn load_config_from_str(toml: &str) -> Result<StashConfig> {
    defaults()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()
        .context("Failed to build configuration")?
        .try_deserialize()
        .context("Failed to deserialize configuration")
}
