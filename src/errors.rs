//! # Auth Errors
//!
//! All error paths are explicit. Policy failures and storage failures
//! travel on separate variants so hosts can tell a denied login apart
//! from a broken backend.

use thiserror::Error;

/// Result type for auth core operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors surfaced by the auth core
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// A policy failure (already registered, bad credentials, blocked by
    /// a hook or check) raised under `FailurePolicy::Error`. The payload
    /// is the human-readable failure text.
    #[error("{0}")]
    Denied(String),

    /// A storage failure outside the register/login failure channel.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors raised by `Storage` implementations
///
/// Display text is significant: register/login re-wrap these verbatim
/// into the failure channel, so a storage-level duplicate reads the same
/// as the core's own uniqueness check.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("User with this email already exists.")]
    DuplicateEmail,

    #[error("Token already exists")]
    DuplicateToken,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Backend(String),
}

/// The failure object handed to `on_register_failure` / `on_login_failure`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailure {
    /// Human-readable failure text, as rendered to the caller
    pub message: String,
}

impl AuthFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
