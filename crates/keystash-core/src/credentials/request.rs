//! Typed backend requests

use super::key::CredentialKey;
use super::value::CredentialValue;
use serde::{Deserialize, Serialize};

/// Item class of a stored secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemClass {
    /// Generic password / secret blob
    #[default]
    GenericPassword,
}

impl ItemClass {
    /// Stable tag used by backends that persist the class
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GenericPassword => "genp",
        }
    }
}

/// Exact-match selector for one entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchSpec {
    /// Item class
    pub class: ItemClass,
    /// Service as stored in the backend (prefix applied)
    pub service: String,
    /// Account
    pub account: String,
}

impl MatchSpec {
    /// Match the generic-password entry for a key
    #[must_use]
    pub fn for_key(key: &CredentialKey) -> Self {
        Self {
            class: ItemClass::GenericPassword,
            service: key.service().to_string(),
            account: key.account().to_string(),
        }
    }

    /// Prefix the service name as `"{prefix}-{service}"`
    #[must_use]
    pub fn with_service_prefix(mut self, prefix: &str) -> Self {
        self.service = format!("{}-{}", prefix, self.service);
        self
    }

    /// Flat `class:service:account` string for map-backed stores
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("{}:{}:{}", self.class.as_str(), self.service, self.account)
    }
}

/// Add a new entry
#[derive(Debug, Clone)]
pub struct CreateRequest {
    /// Identity of the new entry
    pub spec: MatchSpec,
    /// Secret to store
    pub value: CredentialValue,
}

impl CreateRequest {
    /// Build a create request
    #[must_use]
    pub fn new(spec: MatchSpec, value: CredentialValue) -> Self {
        Self { spec, value }
    }
}

/// Replace the value of an existing entry
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    /// Entry to update
    pub spec: MatchSpec,
    /// Replacement secret
    pub value: CredentialValue,
}

impl UpdateRequest {
    /// Build an update request
    #[must_use]
    pub fn new(spec: MatchSpec, value: CredentialValue) -> Self {
        Self { spec, value }
    }
}

/// Look up entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    /// Entry selector
    pub spec: MatchSpec,
    /// Return the secret bytes
    pub return_data: bool,
    /// Maximum number of matches
    pub limit: u32,
}

impl QueryRequest {
    /// At most one exact match, with data
    #[must_use]
    pub fn single(spec: MatchSpec) -> Self {
        Self {
            spec,
            return_data: true,
            limit: 1,
        }
    }
}
