//! Keystash Core - Credential storage
//!
//! This crate provides the credential store: a uniform save / load /
//! update / delete surface over platform secret stores, keyed by
//! (service, account).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credentials;

pub use credentials::{
    bytes_from_text, text_from_bytes, BackendKind, CredentialKey, CredentialStore,
    CredentialValue, InvalidKey, SecretBackend, Status, StoreError,
};
