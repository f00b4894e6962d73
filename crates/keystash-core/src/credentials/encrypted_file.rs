//! Encrypted file backend using AES-256-GCM

use super::backend::SecretBackend;
use super::request::{CreateRequest, ItemClass, MatchSpec, QueryRequest, UpdateRequest};
use super::status::{code, lock_poisoned, Status};
use super::value::CredentialValue;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use dashmap::DashMap;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use zeroize::Zeroizing;

/// Environment variable holding the master key
pub const MASTER_KEY_ENV: &str = "KEYSTASH_MASTER_KEY";

const KEY_SALT: &[u8] = b"keystash-credential-store-v1";
const NONCE_LEN: usize = 12;

/// One entry as persisted inside the encrypted blob
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileRecord {
    class: ItemClass,
    service: String,
    account: String,
    /// Base64 of the secret bytes
    value: String,
}

type Records = HashMap<String, FileRecord>;

/// One lock per absolute file path, shared by every backend in the process
static FILE_LOCKS: OnceLock<DashMap<PathBuf, Arc<Mutex<()>>>> = OnceLock::new();

fn file_lock(path: &Path) -> Arc<Mutex<()>> {
    let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    FILE_LOCKS
        .get_or_init(DashMap::new)
        .entry(key)
        .or_default()
        .clone()
}

/// Stores every entry in one AES-256-GCM encrypted, base64-encoded file.
///
/// Each mutation loads the whole file, applies the change, and replaces the
/// file through an atomic rename, so readers never see a partial write.
/// The cycle is serialized per path across all backends in the process;
/// separate processes sharing one file are not coordinated.
pub struct EncryptedFileBackend {
    path: PathBuf,
    key: Zeroizing<[u8; 32]>,
    lock: Arc<Mutex<()>>,
}

impl EncryptedFileBackend {
    /// Open a backend at `path`, deriving the key from the environment
    ///
    /// Uses `KEYSTASH_MASTER_KEY` when set, otherwise a machine-specific
    /// fallback built from hostname and user name.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let master_key = std::env::var(MASTER_KEY_ENV).unwrap_or_else(|_| machine_master_key());
        Self::with_master_key(path, &master_key)
    }

    /// Open a backend at `path` with an explicit master key
    #[must_use]
    pub fn with_master_key(path: impl Into<PathBuf>, master_key: &str) -> Self {
        let path = path.into();
        Self {
            lock: file_lock(&path),
            key: derive_encryption_key(master_key),
            path,
        }
    }

    /// Default location: `<data_dir>/keystash/credentials.enc`
    pub fn default_path() -> Option<PathBuf> {
        let data_dir = dirs::data_dir().or_else(dirs::home_dir)?;
        Some(data_dir.join("keystash").join("credentials.enc"))
    }

    /// Path of the encrypted file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, Status> {
        let cipher = Aes256Gcm::new_from_slice(&self.key[..]).map_err(|e| {
            Status::failure(code::INTERNAL_COMPONENT, format!("Failed to create cipher: {}", e))
        })?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher.encrypt(nonce, plaintext).map_err(|e| {
            Status::failure(code::INTERNAL_COMPONENT, format!("Encryption failed: {}", e))
        })?;

        // Nonce is prepended to the ciphertext
        let mut result = nonce_bytes.to_vec();
        result.extend(ciphertext);
        Ok(result)
    }

    fn decrypt(&self, encrypted: &[u8]) -> Result<Vec<u8>, Status> {
        if encrypted.len() < NONCE_LEN {
            return Err(Status::failure(code::DECODE, "Invalid encrypted data"));
        }

        let cipher = Aes256Gcm::new_from_slice(&self.key[..]).map_err(|e| {
            Status::failure(code::INTERNAL_COMPONENT, format!("Failed to create cipher: {}", e))
        })?;

        let (nonce_bytes, ciphertext) = encrypted.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| {
                Status::failure(code::AUTH_FAILED, "Decryption failed (wrong master key?)")
            })
    }

    fn load_records(&self) -> Result<Records, Status> {
        if !self.path.exists() {
            return Ok(Records::new());
        }

        let encoded = std::fs::read_to_string(&self.path).map_err(|e| {
            Status::failure(code::IO, format!("Failed to read credentials file: {}", e))
        })?;
        // Empty file: nothing stored yet
        if encoded.trim().is_empty() {
            return Ok(Records::new());
        }

        let encrypted = BASE64.decode(encoded.trim()).map_err(|e| {
            Status::failure(code::DECODE, format!("Failed to decode credentials: {}", e))
        })?;
        let decrypted = Zeroizing::new(self.decrypt(&encrypted)?);

        let records: Records = serde_json::from_slice(&decrypted).map_err(|e| {
            Status::failure(code::DECODE, format!("Failed to parse credentials: {}", e))
        })?;

        debug!(count = records.len(), "Loaded credentials from encrypted file");
        Ok(records)
    }

    fn save_records(&self, records: &Records) -> Result<(), Status> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|e| {
            Status::failure(code::IO, format!("Failed to create directory: {}", e))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            let _ = std::fs::set_permissions(parent, perms);
        }

        let json = Zeroizing::new(serde_json::to_vec(records).map_err(|e| {
            Status::failure(
                code::INTERNAL_COMPONENT,
                format!("Failed to serialize credentials: {}", e),
            )
        })?);
        let encoded = BASE64.encode(self.encrypt(&json)?);

        // Sibling temp file (0600 on Unix), then rename over the target
        let mut staged = NamedTempFile::new_in(parent).map_err(write_error)?;
        staged.write_all(encoded.as_bytes()).map_err(write_error)?;
        staged.as_file().sync_all().map_err(write_error)?;
        staged
            .persist(&self.path)
            .map_err(|e| write_error(e.error))?;

        debug!(path = %self.path.display(), "Saved credentials to encrypted file");
        Ok(())
    }

    /// Load, apply `change`, and write back when it reports success
    fn modify<F>(&self, change: F) -> Status
    where
        F: FnOnce(&mut Records) -> Status,
    {
        let _guard = match self.lock.lock() {
            Ok(guard) => guard,
            Err(e) => return lock_poisoned(e),
        };

        let mut records = match self.load_records() {
            Ok(records) => records,
            Err(status) => return status,
        };

        let status = change(&mut records);
        if !status.is_success() {
            return status;
        }

        match self.save_records(&records) {
            Ok(()) => Status::Success,
            Err(status) => status,
        }
    }
}

impl std::fmt::Debug for EncryptedFileBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedFileBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SecretBackend for EncryptedFileBackend {
    fn name(&self) -> &'static str {
        "encrypted_file"
    }

    fn create(&self, request: &CreateRequest) -> Status {
        let status = self.modify(|records| {
            let key = request.spec.storage_key();
            if records.contains_key(&key) {
                return Status::DuplicateItem;
            }
            records.insert(key, record_for(&request.spec, &request.value));
            Status::Success
        });

        if status.is_success() {
            info!(
                service = %request.spec.service,
                account = %request.spec.account,
                "Credential stored with AES-256-GCM encryption"
            );
        }
        status
    }

    fn update(&self, request: &UpdateRequest) -> Status {
        self.modify(|records| match records.get_mut(&request.spec.storage_key()) {
            Some(existing) => {
                *existing = record_for(&request.spec, &request.value);
                Status::Success
            }
            None => Status::ItemNotFound,
        })
    }

    fn query(&self, request: &QueryRequest) -> (Status, Option<CredentialValue>) {
        let _guard = match self.lock.lock() {
            Ok(guard) => guard,
            Err(e) => return (lock_poisoned(e), None),
        };

        let records = match self.load_records() {
            Ok(records) => records,
            Err(status) => return (status, None),
        };

        let Some(record) = records.get(&request.spec.storage_key()) else {
            return (Status::ItemNotFound, None);
        };
        if !request.return_data {
            return (Status::Success, None);
        }

        match BASE64.decode(&record.value) {
            Ok(bytes) => (Status::Success, Some(CredentialValue::new(bytes))),
            Err(e) => (
                Status::failure(code::DECODE, format!("Corrupt credential value: {}", e)),
                None,
            ),
        }
    }

    fn delete(&self, spec: &MatchSpec) -> Status {
        let status = self.modify(|records| match records.remove(&spec.storage_key()) {
            Some(_) => Status::Success,
            None => Status::ItemNotFound,
        });

        if status.is_success() {
            info!(
                service = %spec.service,
                account = %spec.account,
                "Credential deleted from encrypted storage"
            );
        }
        status
    }
}

fn write_error(e: std::io::Error) -> Status {
    Status::failure(code::IO, format!("Failed to write credentials file: {}", e))
}

fn record_for(spec: &MatchSpec, value: &CredentialValue) -> FileRecord {
    FileRecord {
        class: spec.class,
        service: spec.service.clone(),
        account: spec.account.clone(),
        value: BASE64.encode(value.expose()),
    }
}

/// Machine-specific master key used when `KEYSTASH_MASTER_KEY` is unset.
/// Offers basic protection only.
fn machine_master_key() -> String {
    let hostname = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "keystash-default".to_string());
    let username = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "keystash-user".to_string());
    format!("keystash-auto-key-{}-{}", hostname, username)
}

/// SHA-256 over master key and salt
fn derive_encryption_key(master_key: &str) -> Zeroizing<[u8; 32]> {
    let mut hasher = Sha256::new();
    hasher.update(master_key.as_bytes());
    hasher.update(KEY_SALT);
    let digest = hasher.finalize();

    let mut key = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&digest);
    key
}
