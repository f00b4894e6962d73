//! Credential store errors

use super::key::CredentialKey;
use super::status::Status;
use thiserror::Error;

/// Errors surfaced by [`CredentialStore`](super::CredentialStore)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The operation required an existing entry
    #[error("Credential not found: {service}:{account}")]
    NotFound {
        /// Requested service
        service: String,
        /// Requested account
        account: String,
    },

    /// The backend reported any other failure
    #[error("Backend failure ({code}): {}", .message.as_deref().unwrap_or("no diagnostic"))]
    BackendFailure {
        /// Backend status code
        code: i32,
        /// Best-effort diagnostic
        message: Option<String>,
    },
}

impl StoreError {
    pub(crate) fn not_found(key: &CredentialKey) -> Self {
        Self::NotFound {
            service: key.service().to_string(),
            account: key.account().to_string(),
        }
    }

    pub(crate) fn from_status(status: &Status) -> Self {
        Self::BackendFailure {
            code: status.code(),
            message: status.message(),
        }
    }

    /// Check for [`StoreError::NotFound`]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for credential operations
pub type Result<T> = std::result::Result<T, StoreError>;
