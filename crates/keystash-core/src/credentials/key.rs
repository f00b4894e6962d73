//! Credential key types

use std::fmt;
use thiserror::Error;

/// Rejected key construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("credential {field} must not be empty")]
pub struct InvalidKey {
    /// Which part of the key was empty (`service` or `account`)
    pub field: &'static str,
}

/// The (service, account) pair identifying one stored secret.
///
/// Both parts are kept exactly as given: comparison is case-sensitive and
/// whitespace-significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CredentialKey {
    service: String,
    account: String,
}

impl CredentialKey {
    /// Create a key, rejecting empty parts
    pub fn new(
        service: impl Into<String>,
        account: impl Into<String>,
    ) -> Result<Self, InvalidKey> {
        let service = service.into();
        let account = account.into();

        if service.is_empty() {
            return Err(InvalidKey { field: "service" });
        }
        if account.is_empty() {
            return Err(InvalidKey { field: "account" });
        }

        Ok(Self { service, account })
    }

    /// Service name
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Account name
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service, self.account)
    }
}
