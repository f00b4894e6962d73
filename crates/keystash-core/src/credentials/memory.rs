//! In-memory backend

use super::backend::SecretBackend;
use super::request::{CreateRequest, MatchSpec, QueryRequest, UpdateRequest};
use super::status::{lock_poisoned, Status};
use super::value::CredentialValue;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Process-local backend (tests and ephemeral use)
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<MatchSpec, CredentialValue>>,
}

impl MemoryBackend {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    ///
    /// Counts through a poisoned lock: the map is still intact after a
    /// panicking writer, so the real size is reported.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn create(&self, request: &CreateRequest) -> Status {
        let mut entries = match self.entries.write() {
            Ok(entries) => entries,
            Err(e) => return lock_poisoned(e),
        };
        if entries.contains_key(&request.spec) {
            return Status::DuplicateItem;
        }
        entries.insert(request.spec.clone(), request.value.clone());
        Status::Success
    }

    fn update(&self, request: &UpdateRequest) -> Status {
        let mut entries = match self.entries.write() {
            Ok(entries) => entries,
            Err(e) => return lock_poisoned(e),
        };
        match entries.get_mut(&request.spec) {
            Some(existing) => {
                *existing = request.value.clone();
                Status::Success
            }
            None => Status::ItemNotFound,
        }
    }

    fn query(&self, request: &QueryRequest) -> (Status, Option<CredentialValue>) {
        let entries = match self.entries.read() {
            Ok(entries) => entries,
            Err(e) => return (lock_poisoned(e), None),
        };
        match entries.get(&request.spec) {
            Some(value) if request.return_data => (Status::Success, Some(value.clone())),
            Some(_) => (Status::Success, None),
            None => (Status::ItemNotFound, None),
        }
    }

    fn delete(&self, spec: &MatchSpec) -> Status {
        let mut entries = match self.entries.write() {
            Ok(entries) => entries,
            Err(e) => return lock_poisoned(e),
        };
        match entries.remove(spec) {
            Some(_) => Status::Success,
            None => Status::ItemNotFound,
        }
    }
}
