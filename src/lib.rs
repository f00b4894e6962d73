//! Keystash - secret storage over platform credential stores
//!
//! Wires configuration and logging around [`keystash_core`]:
//!
//! ```no_run
//! use keystash::{load_config, open_store, CredentialKey};
//!
//! let config = load_config()?;
//! keystash::init_tracing(&config.logging)?;
//! let store = open_store(&config)?;
//!
//! let key = CredentialKey::new("token", "auth")?;
//! store.save(&key, "TestToken")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod loader;
pub mod logging;

use anyhow::Result;
use tracing::info;

pub use crate::config::{LoggingConfig, StashConfig, StoreConfig};
pub use crate::loader::{load_config, load_config_from_str};
pub use crate::logging::init_tracing;
pub use keystash_core::credentials::{
    bytes_from_text, text_from_bytes, BackendKind, CredentialKey, CredentialStore,
    CredentialValue, StoreError,
};

/// Build the credential store described by `config`
pub fn open_store(config: &StashConfig) -> Result<CredentialStore> {
    config.validate()?;

    let store = &config.store;
    let mut credentials =
        CredentialStore::with_backend_at(store.backend, store.file_path.clone());
    if let Some(prefix) = &store.service_prefix {
        credentials = credentials.with_prefix(prefix.clone());
    }

    info!(
        backend = credentials.backend_name(),
        prefix = ?store.service_prefix,
        "Credential store ready"
    );
    Ok(credentials)
}
