//! # Storage Contract
//!
//! User and token persistence the auth core calls through. The core
//! never reimplements persistence: it performs sequential blocking
//! calls against this trait and lets any storage error propagate
//! immediately, with no retries.
//!
//! Email uniqueness under concurrency belongs here, not in the core.
//! The core's check-then-create sequence has a documented race window;
//! a unique constraint in the implementation must close it by failing
//! the create, which the core surfaces verbatim.
//!
//! [`MemoryStorage`] is a complete in-process implementation, suitable
//! for tests and single-process hosts.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::errors::{StorageError, StorageResult};
use crate::session::TokenRecord;
use crate::user::User;

// ==================
// Storage Contract
// ==================

/// User/token persistence operations consumed by the auth core
pub trait Storage: Send + Sync {
    fn find_by_email(&self, email: &str) -> StorageResult<Option<User>>;

    /// Resolve a token to its owning user.
    ///
    /// A token whose expiration has passed must resolve to `None`,
    /// whether or not the row has been purged yet.
    fn find_by_token(&self, token: &str) -> StorageResult<Option<User>>;

    fn find_by_id(&self, user_id: Uuid) -> StorageResult<Option<User>>;

    /// Persist a new user. Must reject malformed emails, enforce email
    /// uniqueness, and assign and return a generated id.
    fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        custom_fields: &Map<String, Value>,
    ) -> StorageResult<User>;

    /// Apply `fields` on top of the user's attributes and return the
    /// result. An empty map is a no-op returning an equal user.
    fn update_user(&self, user: &User, fields: &Map<String, Value>) -> StorageResult<User>;

    /// Persist a freshly issued token. Must enforce token uniqueness.
    fn store_token(
        &self,
        user: &User,
        token: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> StorageResult<()>;

    /// Delete one token, returning the removed count (0 or 1)
    fn delete_token(&self, token: &str) -> StorageResult<u64>;

    /// Delete every token owned by a user, returning the removed count
    fn delete_tokens_by_user_id(&self, user_id: Uuid) -> StorageResult<u64>;

    /// Idempotent schema provisioning. Out of core scope; hosts call
    /// this before first use where the backend needs it.
    fn create_schema(&self) -> StorageResult<()>;
}

// ==================
// In-Memory Storage
// ==================

/// In-process storage backed by `RwLock`'d maps
pub struct MemoryStorage {
    users: RwLock<HashMap<Uuid, User>>,
    tokens: RwLock<HashMap<String, TokenRecord>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            tokens: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn find_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let users = self.users.read().unwrap();
        Ok(users
            .values()
            .find(|u| {
                u.email()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .cloned())
    }

    fn find_by_token(&self, token: &str) -> StorageResult<Option<User>> {
        let record = {
            let tokens = self.tokens.read().unwrap();
            tokens.get(token).cloned()
        };

        let Some(record) = record else {
            return Ok(None);
        };
        // Expired-but-unpurged rows are absent, not valid
        if record.is_expired(Utc::now()) {
            return Ok(None);
        }
        self.find_by_id(record.user_id)
    }

    fn find_by_id(&self, user_id: Uuid) -> StorageResult<Option<User>> {
        let users = self.users.read().unwrap();
        Ok(users.get(&user_id).cloned())
    }

    fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        custom_fields: &Map<String, Value>,
    ) -> StorageResult<User> {
        if !is_valid_email(email) {
            return Err(StorageError::InvalidEmail(email.to_string()));
        }

        let mut users = self.users.write().unwrap();
        // Unique constraint: checked under the write lock, so two
        // concurrent creates for one email cannot both succeed.
        if users.values().any(|u| {
            u.email()
                .is_some_and(|e| e.eq_ignore_ascii_case(email))
        }) {
            return Err(StorageError::DuplicateEmail);
        }

        let id = Uuid::new_v4();
        let mut attributes = Map::new();
        attributes.insert("id".to_string(), json!(id.to_string()));
        attributes.insert("email".to_string(), json!(email));
        attributes.insert("password_hash".to_string(), json!(password_hash));
        for (key, value) in custom_fields {
            // Reserved keys win over caller-supplied duplicates
            if !attributes.contains_key(key) {
                attributes.insert(key.clone(), value.clone());
            }
        }

        let user = User::from_attributes(attributes);
        users.insert(id, user.clone());
        Ok(user)
    }

    fn update_user(&self, user: &User, fields: &Map<String, Value>) -> StorageResult<User> {
        let id = user.id().ok_or(StorageError::UserNotFound)?;
        let mut users = self.users.write().unwrap();
        let stored = users.get(&id).ok_or(StorageError::UserNotFound)?;

        if fields.is_empty() {
            return Ok(stored.clone());
        }

        let mut attributes = stored.raw().clone();
        for (key, value) in fields {
            attributes.insert(key.clone(), value.clone());
        }
        let updated = User::from_attributes(attributes);
        users.insert(id, updated.clone());
        Ok(updated)
    }

    fn store_token(
        &self,
        user: &User,
        token: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> StorageResult<()> {
        let user_id = user.id().ok_or(StorageError::UserNotFound)?;
        let mut tokens = self.tokens.write().unwrap();
        if tokens.contains_key(token) {
            return Err(StorageError::DuplicateToken);
        }
        tokens.insert(
            token.to_string(),
            TokenRecord {
                token: token.to_string(),
                user_id,
                created_at: Utc::now(),
                expires_at,
            },
        );
        Ok(())
    }

    fn delete_token(&self, token: &str) -> StorageResult<u64> {
        let mut tokens = self.tokens.write().unwrap();
        Ok(u64::from(tokens.remove(token).is_some()))
    }

    fn delete_tokens_by_user_id(&self, user_id: Uuid) -> StorageResult<u64> {
        let mut tokens = self.tokens.write().unwrap();
        let before = tokens.len();
        tokens.retain(|_, record| record.user_id != user_id);
        Ok((before - tokens.len()) as u64)
    }

    fn create_schema(&self) -> StorageResult<()> {
        // Nothing to provision for in-memory maps
        Ok(())
    }
}

// ==================
// Helpers
// ==================

/// Basic email shape validation
fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }

    let local = parts[0];
    let domain = parts[1];

    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
