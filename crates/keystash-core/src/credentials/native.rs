//! OS credential store backend (macOS Keychain, Linux Secret Service,
//! Windows Credential Manager) via the `keyring` crate

use super::backend::{BackendKind, SecretBackend};
use super::request::{CreateRequest, MatchSpec, QueryRequest, UpdateRequest};
use super::status::{code, Status};
use super::value::CredentialValue;
use keyring::Entry;
use tracing::warn;

/// Native platform backend.
///
/// The keyring API has no create-only or update-only call, so existence is
/// checked first. The check and the write are two platform calls; atomicity
/// across concurrent writers of the same key is what the platform gives.
#[derive(Debug, Clone, Copy)]
pub struct NativeBackend {
    kind: BackendKind,
}

impl NativeBackend {
    /// Backend for a native kind (`Keychain`, `SecretService`, `WindowsCredential`)
    #[must_use]
    pub fn new(kind: BackendKind) -> Self {
        Self { kind }
    }

    fn entry(spec: &MatchSpec) -> Result<Entry, Status> {
        Entry::new(&spec.service, &spec.account).map_err(status_from_error)
    }

    /// Success if an entry exists, `ItemNotFound` if not
    fn existing_status(entry: &Entry) -> Status {
        match entry.get_secret() {
            Ok(mut bytes) => {
                zeroize::Zeroize::zeroize(&mut bytes);
                Status::Success
            }
            Err(e) => status_from_error(e),
        }
    }
}

impl SecretBackend for NativeBackend {
    fn name(&self) -> &'static str {
        match self.kind {
            BackendKind::Keychain => "keychain",
            BackendKind::WindowsCredential => "windows_credential",
            _ => "secret_service",
        }
    }

    fn create(&self, request: &CreateRequest) -> Status {
        let entry = match Self::entry(&request.spec) {
            Ok(entry) => entry,
            Err(status) => return status,
        };
        match Self::existing_status(&entry) {
            Status::Success => return Status::DuplicateItem,
            Status::ItemNotFound => {}
            other => return other,
        }
        match entry.set_secret(request.value.expose()) {
            Ok(()) => Status::Success,
            Err(e) => status_from_error(e),
        }
    }

    fn update(&self, request: &UpdateRequest) -> Status {
        let entry = match Self::entry(&request.spec) {
            Ok(entry) => entry,
            Err(status) => return status,
        };
        let status = Self::existing_status(&entry);
        if !status.is_success() {
            return status;
        }
        match entry.set_secret(request.value.expose()) {
            Ok(()) => Status::Success,
            Err(e) => status_from_error(e),
        }
    }

    fn query(&self, request: &QueryRequest) -> (Status, Option<CredentialValue>) {
        let entry = match Self::entry(&request.spec) {
            Ok(entry) => entry,
            Err(status) => return (status, None),
        };
        match entry.get_secret() {
            Ok(bytes) if request.return_data => {
                (Status::Success, Some(CredentialValue::new(bytes)))
            }
            Ok(mut bytes) => {
                zeroize::Zeroize::zeroize(&mut bytes);
                (Status::Success, None)
            }
            Err(e) => (status_from_error(e), None),
        }
    }

    fn delete(&self, spec: &MatchSpec) -> Status {
        let entry = match Self::entry(spec) {
            Ok(entry) => entry,
            Err(status) => return status,
        };
        match entry.delete_credential() {
            Ok(()) => Status::Success,
            Err(e) => status_from_error(e),
        }
    }
}

/// Classify a keyring error
fn status_from_error(e: keyring::Error) -> Status {
    match e {
        keyring::Error::NoEntry => Status::ItemNotFound,
        keyring::Error::NoStorageAccess(err) => {
            warn!(error = %err, "Credential store not accessible");
            Status::failure(code::NOT_AVAILABLE, err.to_string())
        }
        keyring::Error::PlatformFailure(err) => {
            warn!(error = %err, "Credential store platform failure");
            Status::failure(code::INTERNAL_COMPONENT, err.to_string())
        }
        keyring::Error::BadEncoding(_) => {
            Status::failure(code::DECODE, "Stored credential is not valid UTF-8")
        }
        keyring::Error::TooLong(attr, limit) => Status::failure(
            code::PARAM,
            format!("Attribute '{}' is longer than platform limit of {} chars", attr, limit),
        ),
        keyring::Error::Invalid(attr, reason) => {
            Status::failure(code::PARAM, format!("Attribute '{}' is invalid: {}", attr, reason))
        }
        keyring::Error::Ambiguous(_) => {
            Status::failure(code::PARAM, "More than one credential matches")
        }
        other => Status::failure(code::INTERNAL_COMPONENT, other.to_string()),
    }
}
