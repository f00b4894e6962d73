//! Credential store implementation

use super::backend::{BackendKind, SecretBackend};
use super::encrypted_file::EncryptedFileBackend;
use super::error::{Result, StoreError};
use super::key::CredentialKey;
use super::memory::MemoryBackend;
use super::request::{CreateRequest, MatchSpec, QueryRequest, UpdateRequest};
use super::status::{code, Status};
use super::value::CredentialValue;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Upsert-style secret storage over a [`SecretBackend`].
///
/// The store holds no copy of any secret. Every operation is one backend
/// call (save may add one update) and every status is classified exactly
/// once; nothing is retried.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn SecretBackend>,
    /// Optional namespace, applied as `"{prefix}-{service}"`
    service_prefix: Option<String>,
}

impl CredentialStore {
    /// Create a new credential store with auto-detected backend
    #[must_use]
    pub fn new() -> Self {
        Self::with_backend(BackendKind::Auto)
    }

    /// Create with a specific backend kind
    ///
    /// Native kinds fall back to the encrypted file when the crate is built
    /// without the `native-keyring` feature.
    #[must_use]
    pub fn with_backend(kind: BackendKind) -> Self {
        Self::with_backend_at(kind, None)
    }

    /// Create with a specific backend kind and an encrypted file location
    #[must_use]
    pub fn with_backend_at(kind: BackendKind, file_path: Option<PathBuf>) -> Self {
        let resolved = kind.resolve();
        Self::from_backend(build_backend(resolved, file_path))
    }

    /// Wrap an existing backend
    #[must_use]
    pub fn from_backend(backend: Arc<dyn SecretBackend>) -> Self {
        info!(backend = backend.name(), "Initializing credential store");
        Self {
            backend,
            service_prefix: None,
        }
    }

    /// Create an in-memory store (for testing)
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(MemoryBackend::new()))
    }

    /// Set the service prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.service_prefix = Some(prefix.into());
        self
    }

    /// Name of the backend in use
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub(crate) fn match_spec(&self, key: &CredentialKey) -> MatchSpec {
        let spec = MatchSpec::for_key(key);
        match &self.service_prefix {
            Some(prefix) => spec.with_service_prefix(prefix),
            None => spec,
        }
    }

    /// Store a secret, replacing any existing value
    pub fn save(&self, key: &CredentialKey, value: impl AsRef<[u8]>) -> Result<()> {
        let spec = self.match_spec(key);
        debug!(service = %spec.service, account = %spec.account, "Storing credential");

        let value = CredentialValue::new(value.as_ref());
        match self.backend.create(&CreateRequest::new(spec, value.clone())) {
            Status::Success => Ok(()),
            Status::DuplicateItem => {
                debug!(
                    service = %key.service(),
                    account = %key.account(),
                    "Credential exists, updating in place"
                );
                self.update(key, value.expose())
            }
            status => Err(self.failure("save", key, &status)),
        }
    }

    /// Replace the value of an existing secret
    pub fn update(&self, key: &CredentialKey, value: impl AsRef<[u8]>) -> Result<()> {
        let spec = self.match_spec(key);
        debug!(service = %spec.service, account = %spec.account, "Updating credential");

        let request = UpdateRequest::new(spec, CredentialValue::new(value.as_ref()));
        match self.backend.update(&request) {
            Status::Success => Ok(()),
            Status::ItemNotFound => Err(StoreError::not_found(key)),
            status => Err(self.failure("update", key, &status)),
        }
    }

    /// Retrieve a secret; `Ok(None)` when nothing is stored under `key`
    pub fn load(&self, key: &CredentialKey) -> Result<Option<CredentialValue>> {
        let spec = self.match_spec(key);
        debug!(service = %spec.service, account = %spec.account, "Retrieving credential");

        match self.backend.query(&QueryRequest::single(spec)) {
            (Status::Success, Some(value)) => Ok(Some(value)),
            (Status::Success, None) => {
                let status = Status::failure(code::DECODE, "Backend returned no data");
                Err(self.failure("load", key, &status))
            }
            (Status::ItemNotFound, _) => Ok(None),
            (status, _) => Err(self.failure("load", key, &status)),
        }
    }

    /// Delete a secret; deleting an absent key succeeds
    pub fn delete(&self, key: &CredentialKey) -> Result<()> {
        let spec = self.match_spec(key);
        debug!(service = %spec.service, account = %spec.account, "Deleting credential");

        match self.backend.delete(&spec) {
            Status::Success | Status::ItemNotFound => Ok(()),
            status => Err(self.failure("delete", key, &status)),
        }
    }

    /// Check if a credential exists
    pub fn exists(&self, key: &CredentialKey) -> Result<bool> {
        Ok(self.load(key)?.is_some())
    }

    /// Get credential from environment variable, falling back to store
    pub fn load_or_env(
        &self,
        key: &CredentialKey,
        env_var: &str,
    ) -> Result<Option<CredentialValue>> {
        if let Ok(value) = std::env::var(env_var) {
            debug!(env_var = %env_var, "Using credential from environment");
            return Ok(Some(CredentialValue::from(value)));
        }

        self.load(key)
    }

    fn failure(&self, op: &str, key: &CredentialKey, status: &Status) -> StoreError {
        let error = StoreError::from_status(status);
        warn!(
            op,
            backend = self.backend.name(),
            service = %key.service(),
            account = %key.account(),
            code = status.code(),
            "Credential backend failure"
        );
        error
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("backend", &self.backend.name())
            .field("service_prefix", &self.service_prefix)
            .finish()
    }
}

fn build_backend(kind: BackendKind, file_path: Option<PathBuf>) -> Arc<dyn SecretBackend> {
    match kind {
        BackendKind::Memory => Arc::new(MemoryBackend::new()),
        native if native.is_native() => native_backend(native, file_path),
        _ => encrypted_file_backend(file_path),
    }
}

#[cfg(feature = "native-keyring")]
fn native_backend(kind: BackendKind, _file_path: Option<PathBuf>) -> Arc<dyn SecretBackend> {
    Arc::new(super::native::NativeBackend::new(kind))
}

#[cfg(not(feature = "native-keyring"))]
fn native_backend(kind: BackendKind, file_path: Option<PathBuf>) -> Arc<dyn SecretBackend> {
    warn!(
        backend = ?kind,
        feature = "native-keyring",
        "Native credential store not compiled in, using encrypted file"
    );
    encrypted_file_backend(file_path)
}

fn encrypted_file_backend(file_path: Option<PathBuf>) -> Arc<dyn SecretBackend> {
    let path = file_path
        .or_else(EncryptedFileBackend::default_path)
        .unwrap_or_else(|| PathBuf::from("keystash-credentials.enc"));
    Arc::new(EncryptedFileBackend::new(path))
}
