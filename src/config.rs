//! Configuration types
//!
//! Contains the configuration structures for opening a credential store.

use anyhow::{bail, Context, Result};
use keystash_core::BackendKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Application configuration
///
/// Loaded by [`crate::load_config`]; every section falls back to its
/// defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StashConfig {
    /// Backend selection and key namespacing (`[store]`)
    #[serde(default)]
    pub store: StoreConfig,
    /// Tracing subscriber settings (`[logging]`)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StashConfig {
    /// Write the configuration as pretty TOML, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Reject settings that cannot produce a working store
    pub fn validate(&self) -> Result<()> {
        if let Some(prefix) = &self.store.service_prefix {
            if prefix.trim().is_empty() {
                bail!("store.service_prefix must not be blank when set");
            }
        }

        if self.logging.filter.trim().is_empty() {
            bail!("logging.filter must not be empty");
        }

        let backend = self.store.backend.resolve();
        if self.store.file_path.is_some() && backend == BackendKind::Memory {
            warn!("store.file_path is ignored by the memory backend");
        }

        Ok(())
    }
}

/// Credential store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend selection (`auto` picks the platform credential store)
    #[serde(default)]
    pub backend: BackendKind,
    /// Namespace applied to every service name as `{prefix}-{service}`
    #[serde(default)]
    pub service_prefix: Option<String>,
    /// Location of the encrypted file backend
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive, overridden by `RUST_LOG`
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

fn default_filter() -> String {
    "keystash=info,keystash_core=info".to_string()
}
