//! # Password Hashing & Token Generation
//!
//! The core treats password hashing as a black-box one-way function
//! with a verify counterpart, reached through [`CredentialHasher`].
//! The default implementation is Argon2id with a random per-password
//! salt.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use uuid::Uuid;

// ==================
// Hashing Seam
// ==================

/// One-way password hashing contract
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password into a storable digest.
    ///
    /// `None` (or an empty digest) signals a hashing failure; the core
    /// turns it into a `password_hashing_failed` denial.
    fn hash(&self, password: &str) -> Option<String>;

    /// Verify a plaintext password against a stored digest.
    ///
    /// A digest that fails to parse verifies as `false`, never as an
    /// error.
    fn verify(&self, password: &str, digest: &str) -> bool;
}

/// Argon2id hasher with default parameters
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Option<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .ok()
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

// ==================
// Token Generation
// ==================

/// Generate a fresh opaque session token.
///
/// UUID v4: 122 bits of entropy, rendered as the familiar 36-character
/// hyphenated string. Uniqueness is still enforced by storage.
pub fn generate_token() -> String {
    Uuid::new_v4().to_string()
}
