//! Secret value with cryptographic memory wiping

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Encode text as UTF-8 bytes
#[must_use]
pub fn bytes_from_text(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Decode UTF-8 bytes, replacing invalid sequences with U+FFFD
#[must_use]
pub fn text_from_bytes(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// An opaque secret byte sequence that is cleared from memory when dropped
///
/// # Security
///
/// - Bytes are zeroized on drop (via `ZeroizeOnDrop`)
/// - Debug and Display implementations redact the value
/// - Equality is constant-time
///
/// # Example
///
/// ```
/// use keystash_core::credentials::CredentialValue;
///
/// let secret = CredentialValue::from("api-key-12345");
/// assert_eq!(secret.expose(), b"api-key-12345");
///
/// let debug = format!("{:?}", secret);
/// assert!(!debug.contains("api-key"));
/// ```
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct CredentialValue {
    inner: Vec<u8>,
}

impl CredentialValue {
    /// Wrap raw bytes
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: bytes.into(),
        }
    }

    /// Temporarily expose the raw bytes
    ///
    /// The returned slice should not be copied out unnecessarily.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        &self.inner
    }

    /// Decode the value as text (lossy UTF-8)
    #[must_use]
    pub fn to_text(&self) -> String {
        text_from_bytes(&self.inner)
    }

    /// Length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the value is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Wipe the bytes early, leaving an empty value
    pub fn clear(&mut self) {
        self.inner.zeroize();
    }
}

impl From<Vec<u8>> for CredentialValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for CredentialValue {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl From<&str> for CredentialValue {
    fn from(text: &str) -> Self {
        Self::new(bytes_from_text(text))
    }
}

impl From<String> for CredentialValue {
    fn from(text: String) -> Self {
        Self::new(text.into_bytes())
    }
}

impl std::fmt::Debug for CredentialValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CredentialValue([REDACTED, {} bytes])", self.inner.len())
    }
}

impl std::fmt::Display for CredentialValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for CredentialValue {
    fn eq(&self, other: &Self) -> bool {
        self.inner.as_slice().ct_eq(other.inner.as_slice()).into()
    }
}

impl Eq for CredentialValue {}
