//! Backend contract and selection

use super::request::{CreateRequest, MatchSpec, QueryRequest, UpdateRequest};
use super::status::Status;
use super::value::CredentialValue;
use serde::{Deserialize, Serialize};

/// A secure key-value store the credential store delegates to.
///
/// Each method is a single blocking call that reports its outcome as a
/// [`Status`]. Implementations own the uniqueness of entries: at most one
/// entry may exist per [`MatchSpec`].
pub trait SecretBackend: Send + Sync {
    /// Short name for diagnostics
    fn name(&self) -> &'static str;

    /// Add an entry; `DuplicateItem` if one already matches
    fn create(&self, request: &CreateRequest) -> Status;

    /// Replace the value of an existing entry; `ItemNotFound` if none matches
    fn update(&self, request: &UpdateRequest) -> Status;

    /// Fetch the matching entry's value
    fn query(&self, request: &QueryRequest) -> (Status, Option<CredentialValue>);

    /// Remove the matching entry; `ItemNotFound` if none matches
    fn delete(&self, spec: &MatchSpec) -> Status;
}

/// Supported credential backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Automatic selection based on platform
    #[default]
    Auto,
    /// macOS Keychain
    Keychain,
    /// Linux Secret Service (D-Bus)
    SecretService,
    /// Windows Credential Manager
    WindowsCredential,
    /// Encrypted file fallback
    EncryptedFile,
    /// In-memory only (for testing)
    Memory,
}

impl BackendKind {
    /// Detect the best backend for the current platform
    #[must_use]
    pub fn detect() -> Self {
        #[cfg(target_os = "macos")]
        {
            Self::Keychain
        }
        #[cfg(target_os = "linux")]
        {
            Self::SecretService
        }
        #[cfg(target_os = "windows")]
        {
            Self::WindowsCredential
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            Self::EncryptedFile
        }
    }

    /// Resolve Auto to actual backend
    #[must_use]
    pub fn resolve(self) -> Self {
        match self {
            Self::Auto => Self::detect(),
            other => other,
        }
    }

    /// Whether this kind is served by the OS credential store
    #[must_use]
    pub fn is_native(self) -> bool {
        matches!(
            self,
            Self::Keychain | Self::SecretService | Self::WindowsCredential
        )
    }
}
