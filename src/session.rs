//! # Session Context
//!
//! The core keeps the current token in a single named slot of an
//! abstract key-value session store, passed explicitly into every
//! operation that touches it. No hidden ambient state: hosts hand in
//! whatever backs their request session (server-side session, cookie
//! jar adapter, or the in-process [`MemorySession`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ==================
// Session Slot
// ==================

/// The mutable session slot contract
///
/// One logical session/request context per value. The core reads and
/// writes exactly one key (the configured session key) and provides no
/// cross-request locking; concurrent requests sharing one context can
/// race on read/clear and must serialize at the store if that matters.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-process session store backed by a map
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    values: HashMap<String, String>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

// ==================
// Token Record
// ==================

/// One issued bearer token
///
/// `expires_at == None` means the token never expires. A past
/// `expires_at` makes the token unusable even before storage purges
/// the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}
