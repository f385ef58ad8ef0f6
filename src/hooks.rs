//! # Lifecycle Hooks
//!
//! An optional observer/gate the host installs on the auth core. The
//! contract is deliberately partial: every callback has a default
//! no-op (or allow) body, so implementors override only the
//! transitions they care about. Gate callbacks can veto progress;
//! notification callbacks cannot.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::AuthFailure;
use crate::user::User;

// ==================
// Gate Decisions
// ==================

/// Outcome of a gate callback
///
/// Tri-state by construction: allow, block with the default failure
/// text, or block with an overriding message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GateDecision {
    #[default]
    Allow,
    Block(Option<String>),
}

impl GateDecision {
    /// Block with the default failure message
    pub fn block() -> Self {
        Self::Block(None)
    }

    /// Block with a custom failure message
    pub fn block_with(message: impl Into<String>) -> Self {
        Self::Block(Some(message.into()))
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Block(_))
    }
}

// ==================
// Hook Contract
// ==================

/// Lifecycle callbacks, all optional
///
/// `on_before_register` and `on_before_login` are gates; everything
/// else is a pure notification.
#[allow(unused_variables)]
pub trait AuthHooks: Send + Sync {
    /// Gate a registration before any credentials are hashed or stored
    fn on_before_register(
        &self,
        email: &str,
        password: &str,
        custom_fields: &Map<String, Value>,
    ) -> GateDecision {
        GateDecision::Allow
    }

    fn on_register_success(&self, user: &User) {}

    fn on_register_failure(&self, failure: &AuthFailure) {}

    /// Gate a login after credentials verified, before a token exists
    fn on_before_login(&self, user: &User) -> GateDecision {
        GateDecision::Allow
    }

    fn on_login_success(&self, user: &User, token: &str) {}

    fn on_login_failure(&self, failure: &AuthFailure) {}

    /// The current session's user logged out (or was logged out by a
    /// forced revocation that hit the caller's own session)
    fn on_logout(&self, user: &User) {}

    /// The current session's token turned out to be expired or invalid
    /// during lazy resolution
    fn on_logout_expired(&self) {}

    /// Administrative revocation completed. Fired once per call with
    /// the total removed count, never once per token.
    fn on_logout_forced(&self, user_id: Uuid, reason: Option<&str>, removed: u64) {}

    /// A valid session resolved to this user
    fn on_user_active(&self, user: &User) {}

    /// Storage applied an update; `changed` is the update map's key
    /// set, in no guaranteed order
    fn on_user_updated(&self, user: &User, changed: &[String]) {}
}
