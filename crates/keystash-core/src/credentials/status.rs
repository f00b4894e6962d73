//! Backend status codes
//!
//! Codes follow the Security framework's `OSStatus` numbering so that a
//! native keychain failure and a failure from any other backend read the same
//! way in logs.

use std::fmt;

/// Well-known status codes
pub mod code {
    /// Operation succeeded
    pub const SUCCESS: i32 = 0;
    /// Function or operation not implemented
    pub const UNIMPLEMENTED: i32 = -4;
    /// I/O error
    pub const IO: i32 = -36;
    /// One or more parameters were invalid
    pub const PARAM: i32 = -50;
    /// Failed to allocate memory
    pub const ALLOCATE: i32 = -108;
    /// Internal component failure
    pub const INTERNAL_COMPONENT: i32 = -2070;
    /// No keychain or credential store is available
    pub const NOT_AVAILABLE: i32 = -25291;
    /// Authorization or passphrase was rejected
    pub const AUTH_FAILED: i32 = -25293;
    /// The item already exists
    pub const DUPLICATE_ITEM: i32 = -25299;
    /// The item could not be found
    pub const ITEM_NOT_FOUND: i32 = -25300;
    /// User interaction is not allowed
    pub const INTERACTION_NOT_ALLOWED: i32 = -25308;
    /// Unable to decode the provided data
    pub const DECODE: i32 = -26275;
}

/// Human-readable diagnostic for a status code, if the code is well known
#[must_use]
pub fn status_message(status_code: i32) -> Option<&'static str> {
    let message = match status_code {
        code::SUCCESS => "No error.",
        code::UNIMPLEMENTED => "Function or operation not implemented.",
        code::IO => "I/O error.",
        code::PARAM => "One or more parameters passed to a function were not valid.",
        code::ALLOCATE => "Failed to allocate memory.",
        code::INTERNAL_COMPONENT => "An internal component failed.",
        code::NOT_AVAILABLE => "No keychain is available.",
        code::AUTH_FAILED => "The user name or passphrase you entered is not correct.",
        code::DUPLICATE_ITEM => "The specified item already exists in the keychain.",
        code::ITEM_NOT_FOUND => "The specified item could not be found in the keychain.",
        code::INTERACTION_NOT_ALLOWED => "User interaction is not allowed.",
        code::DECODE => "Unable to decode the provided data.",
        _ => return None,
    };
    Some(message)
}

/// Outcome of a single backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The call succeeded
    Success,
    /// A create hit an existing entry
    DuplicateItem,
    /// No entry matched
    ItemNotFound,
    /// Any other failure
    Failure {
        /// Status code, see [`code`]
        code: i32,
        /// Backend-supplied detail, if any
        detail: Option<String>,
    },
}

impl Status {
    /// Failure with a detail message
    #[must_use]
    pub fn failure(code: i32, detail: impl Into<String>) -> Self {
        Self::Failure {
            code,
            detail: Some(detail.into()),
        }
    }

    /// Numeric code of this status
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::Success => code::SUCCESS,
            Self::DuplicateItem => code::DUPLICATE_ITEM,
            Self::ItemNotFound => code::ITEM_NOT_FOUND,
            Self::Failure { code, .. } => *code,
        }
    }

    /// Detail if present, otherwise the lookup message for the code
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Failure {
                detail: Some(detail),
                ..
            } => Some(detail.clone()),
            other => status_message(other.code()).map(str::to_string),
        }
    }

    /// Check for success
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Map an `RwLock`/`Mutex` poison error to a backend status
pub(crate) fn lock_poisoned<T>(e: std::sync::PoisonError<T>) -> Status {
    Status::failure(code::INTERNAL_COMPONENT, format!("Lock poisoned: {}", e))
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => write!(f, "{} ({})", message, self.code()),
            None => write!(f, "status {}", self.code()),
        }
    }
}
