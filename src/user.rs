//! # User Entity
//!
//! A registered identity is an ordered bag of attributes: the invariant
//! keys `id`, `email`, and `password_hash`, plus whatever custom fields
//! the host registered it with. The core never mutates attributes
//! directly; only the storage layer's update operation does.
//!
//! Sensitive attributes never appear in an external view. Which keys
//! count as sensitive is an explicit [`HiddenKeys`] policy value owned
//! by whoever exports the user, not process-wide state.

use serde_json::{Map, Value};
use uuid::Uuid;

// ==================
// Hidden-Key Policy
// ==================

/// Attribute names excluded from every external view of a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenKeys {
    keys: Vec<String>,
}

impl Default for HiddenKeys {
    fn default() -> Self {
        Self {
            keys: [
                "password_hash",
                "totp_secret",
                "recovery_codes",
                "reset_token",
                "reset_token_expires_at",
            ]
            .iter()
            .map(|k| (*k).to_string())
            .collect(),
        }
    }
}

impl HiddenKeys {
    /// An empty policy that hides nothing
    pub fn none() -> Self {
        Self { keys: Vec::new() }
    }

    /// Add another key to the hidden set
    pub fn hide(mut self, key: impl Into<String>) -> Self {
        self.keys.push(key.into());
        self
    }

    pub fn is_hidden(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}

// ==================
// User
// ==================

/// One registered identity
///
/// Constructed by the storage layer on successful registration and
/// immutable afterwards as far as the auth core is concerned.
///
/// Deliberately not `Serialize`: a blanket serializer would bypass the
/// hidden-key policy. External views go through [`User::visible`] or
/// [`User::to_json`]; storage layers persist [`User::raw`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    attributes: Map<String, Value>,
}

impl User {
    /// Build a user from a full attribute map (storage-layer use)
    pub fn from_attributes(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }

    /// The generated user id, if present and well-formed
    pub fn id(&self) -> Option<Uuid> {
        self.attributes
            .get("id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
    }

    pub fn email(&self) -> Option<&str> {
        self.attributes.get("email").and_then(Value::as_str)
    }

    /// The stored password digest. Sensitive: only reachable here and
    /// through `get`/`raw`, never through a filtered view.
    pub fn password_hash(&self) -> Option<&str> {
        self.attributes.get("password_hash").and_then(Value::as_str)
    }

    /// Raw attribute access, hidden keys included
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// The full attribute map, hidden keys included
    pub fn raw(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// All attributes minus the policy's hidden keys, in insertion order
    pub fn visible(&self, policy: &HiddenKeys) -> Map<String, Value> {
        self.attributes
            .iter()
            .filter(|(key, _)| !policy.is_hidden(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// JSON form of the user, filtered through the policy
    pub fn to_json(&self, policy: &HiddenKeys) -> Value {
        Value::Object(self.visible(policy))
    }
}
