//! Credential Store - secret storage over platform credential stores
//!
//! A (service, account) key maps to one opaque secret blob. The store
//! translates save/load/update/delete into typed requests against a
//! [`SecretBackend`] and turns each backend [`Status`] into a
//! [`StoreError`]:
//!
//! - `save` is an upsert: a duplicate on create becomes an update
//! - `update` on a missing key is [`StoreError::NotFound`]
//! - `load` of a missing key is `Ok(None)`
//! - `delete` of a missing key is `Ok(())`
//!
//! ## Backends
//!
//! - macOS Keychain / Linux Secret Service / Windows Credential Manager
//!   (`native-keyring` feature)
//! - Encrypted file fallback (AES-256-GCM)
//! - In-memory

#![forbid(unsafe_code)]

mod backend;
mod encrypted_file;
mod error;
mod key;
mod memory;
#[cfg(feature = "native-keyring")]
mod native;
mod request;
mod status;
mod store;
mod value;

#[cfg(test)]
mod tests;

pub use backend::{BackendKind, SecretBackend};
pub use encrypted_file::{EncryptedFileBackend, MASTER_KEY_ENV};
pub use error::{Result, StoreError};
pub use key::{CredentialKey, InvalidKey};
pub use memory::MemoryBackend;
#[cfg(feature = "native-keyring")]
pub use native::NativeBackend;
pub use request::{CreateRequest, ItemClass, MatchSpec, QueryRequest, UpdateRequest};
pub use status::{code, status_message, Status};
pub use store::CredentialStore;
pub use value::{bytes_from_text, text_from_bytes, CredentialValue};
