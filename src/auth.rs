//! # Auth Core
//!
//! The authentication state machine: registration, login, session
//! retrieval with lazy expiry, logout, forced logout, and updates.
//! Each operation runs to completion synchronously, performing its
//! storage calls in sequence, and owns no state beyond configuration.
//!
//! Every expected policy failure funnels through one `fail` helper,
//! which notifies the relevant failure hook and then renders the
//! failure in the instance's configured mode: an `Err` for hosts that
//! want errors, or an `Ok(Denied(_))` message for hosts that want
//! return values. The mode is chosen once at construction.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::crypto::{generate_token, Argon2Hasher, CredentialHasher};
use crate::errors::{AuthError, AuthFailure, AuthResult};
use crate::hooks::{AuthHooks, GateDecision};
use crate::messages::{DefaultMessages, MessageProvider};
use crate::session::SessionStore;
use crate::storage::Storage;
use crate::user::User;

// ==================
// Configuration
// ==================

/// How policy failures leave the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Policy failures surface as `Err(AuthError::Denied(_))`
    #[default]
    Error,
    /// Policy failures surface as `Ok(AuthOutcome::Denied(_))`
    Message,
}

/// Auth core configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token lifetime in seconds. Zero or negative means tokens never
    /// expire; this is the documented contract, not an error.
    pub token_ttl_secs: i64,
    /// Session-slot key the current token is stored under
    pub session_key: String,
    pub failure_policy: FailurePolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: 60 * 60 * 24,
            session_key: "latchkey.token".to_string(),
            failure_policy: FailurePolicy::Error,
        }
    }
}

// ==================
// Outcomes
// ==================

/// Result of a gated operation under `FailurePolicy::Message`
///
/// Under `FailurePolicy::Error` the `Denied` arm never materializes;
/// denials arrive as `AuthError::Denied` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome<T> {
    Granted(T),
    Denied(String),
}

impl<T> AuthOutcome<T> {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }

    pub fn granted(self) -> Option<T> {
        match self {
            Self::Granted(value) => Some(value),
            Self::Denied(_) => None,
        }
    }

    pub fn denied_message(&self) -> Option<&str> {
        match self {
            Self::Granted(_) => None,
            Self::Denied(message) => Some(message),
        }
    }
}

/// Caller-supplied registration predicate, run in order after the
/// `on_before_register` gate
pub type RegisterCheck<'a> =
    dyn Fn(&str, &str, &Map<String, Value>) -> GateDecision + Send + Sync + 'a;

/// Caller-supplied login predicate, run against the resolved user
pub type LoginCheck = dyn Fn(&User) -> GateDecision + Send + Sync;

// ==================
// Auth Core
// ==================

/// The authentication core
///
/// Composes storage, hashing, messages, and hooks; holds no persistent
/// state of its own.
pub struct Auth<S: Storage> {
    storage: Arc<S>,
    hasher: Arc<dyn CredentialHasher>,
    messages: Arc<dyn MessageProvider>,
    hooks: Option<Arc<dyn AuthHooks>>,
    config: AuthConfig,
}

impl<S: Storage> Auth<S> {
    /// Create a core with the default Argon2 hasher and English messages
    pub fn new(storage: Arc<S>, config: AuthConfig) -> Self {
        Self {
            storage,
            hasher: Arc::new(Argon2Hasher::new()),
            messages: Arc::new(DefaultMessages),
            hooks: None,
            config,
        }
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn CredentialHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_messages(mut self, messages: Arc<dyn MessageProvider>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn AuthHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn set_session_key(&mut self, key: impl Into<String>) {
        self.config.session_key = key.into();
    }

    pub fn set_failure_policy(&mut self, policy: FailurePolicy) {
        self.config.failure_policy = policy;
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    // ==================
    // Registration
    // ==================

    /// Register a new user.
    ///
    /// Order of exits: email uniqueness, `on_before_register` gate,
    /// caller checks (first block short-circuits the rest), password
    /// hashing, persistence. Storage errors during persistence surface
    /// their own message through the failure channel, so a
    /// storage-level duplicate raced past the uniqueness check reads
    /// the same as the check itself.
    pub fn register(
        &self,
        email: &str,
        password: &str,
        custom_fields: &Map<String, Value>,
        checks: &[&RegisterCheck],
    ) -> AuthResult<AuthOutcome<User>> {
        match self.storage.find_by_email(email) {
            Ok(Some(_)) => {
                return self.fail(self.messages.user_already_exists(), |h, f| {
                    h.on_register_failure(f);
                });
            }
            Ok(None) => {}
            Err(e) => {
                return self.fail(e.to_string(), |h, f| h.on_register_failure(f));
            }
        }

        if let Some(hooks) = &self.hooks {
            if let GateDecision::Block(custom) =
                hooks.on_before_register(email, password, custom_fields)
            {
                let message = custom.unwrap_or_else(|| self.messages.registration_blocked());
                return self.fail(message, |h, f| h.on_register_failure(f));
            }
        }

        for check in checks {
            if let GateDecision::Block(custom) = check(email, password, custom_fields) {
                let message = custom.unwrap_or_else(|| self.messages.registration_blocked());
                return self.fail(message, |h, f| h.on_register_failure(f));
            }
        }

        let digest = match self.hasher.hash(password) {
            Some(digest) if !digest.is_empty() => digest,
            _ => {
                return self.fail(self.messages.password_hashing_failed(), |h, f| {
                    h.on_register_failure(f);
                });
            }
        };

        let user = match self.storage.create_user(email, &digest, custom_fields) {
            Ok(user) => user,
            Err(e) => {
                return self.fail(e.to_string(), |h, f| h.on_register_failure(f));
            }
        };

        if let Some(hooks) = &self.hooks {
            hooks.on_register_success(&user);
        }
        debug!(email, "user registered");
        Ok(AuthOutcome::Granted(user))
    }

    // ==================
    // Login
    // ==================

    /// Authenticate credentials and issue a session token.
    ///
    /// On success the token is persisted, written into the session
    /// slot, and returned.
    pub fn login(
        &self,
        session: &mut dyn SessionStore,
        email: &str,
        password: &str,
        checks: &[&LoginCheck],
    ) -> AuthResult<AuthOutcome<String>> {
        let candidate = match self.storage.find_by_email(email) {
            Ok(candidate) => candidate,
            Err(e) => {
                return self.fail(e.to_string(), |h, f| h.on_login_failure(f));
            }
        };

        // One message for "no such user" and "wrong password": the
        // failure text must not reveal which emails are registered.
        let verified = candidate.as_ref().map_or(false, |user| {
            user.password_hash()
                .map_or(false, |digest| self.hasher.verify(password, digest))
        });
        let user = match candidate {
            Some(user) if verified => user,
            _ => {
                return self.fail(self.messages.invalid_credentials(), |h, f| {
                    h.on_login_failure(f);
                });
            }
        };

        if let Some(hooks) = &self.hooks {
            if let GateDecision::Block(custom) = hooks.on_before_login(&user) {
                let message = custom.unwrap_or_else(|| self.messages.login_blocked());
                return self.fail(message, |h, f| h.on_login_failure(f));
            }
        }

        for check in checks {
            if let GateDecision::Block(custom) = check(&user) {
                let message = custom.unwrap_or_else(|| self.messages.login_blocked());
                return self.fail(message, |h, f| h.on_login_failure(f));
            }
        }

        let token = generate_token();
        let expires_at = if self.config.token_ttl_secs > 0 {
            Some(Utc::now() + Duration::seconds(self.config.token_ttl_secs))
        } else {
            None
        };
        if let Err(e) = self.storage.store_token(&user, &token, expires_at) {
            return self.fail(e.to_string(), |h, f| h.on_login_failure(f));
        }

        if let Some(hooks) = &self.hooks {
            hooks.on_login_success(&user, &token);
        }
        session.put(&self.config.session_key, token.clone());
        debug!(email, "login succeeded");
        Ok(AuthOutcome::Granted(token))
    }

    // ==================
    // Session Retrieval
    // ==================

    /// Resolve the current session to a user.
    ///
    /// Expiry is lazy: an absent, invalid, or expired token is
    /// discovered here on next access, clears the slot, and fires
    /// `on_logout_expired`. There is no background sweep.
    pub fn get_user(&self, session: &mut dyn SessionStore) -> AuthResult<Option<User>> {
        let token = match session.get(&self.config.session_key) {
            Some(token) => token,
            None => return Ok(None),
        };

        match self.storage.find_by_token(&token)? {
            Some(user) => {
                if let Some(hooks) = &self.hooks {
                    hooks.on_user_active(&user);
                }
                Ok(Some(user))
            }
            None => {
                // The only slot cleanup outside explicit logout
                session.remove(&self.config.session_key);
                if let Some(hooks) = &self.hooks {
                    hooks.on_logout_expired();
                }
                Ok(None)
            }
        }
    }

    pub fn is_logged_in(&self, session: &mut dyn SessionStore) -> AuthResult<bool> {
        Ok(self.get_user(session)?.is_some())
    }

    // ==================
    // Logout
    // ==================

    /// End the current session. Idempotent: a second call is a no-op.
    pub fn logout(&self, session: &mut dyn SessionStore) -> AuthResult<()> {
        let user = self.get_user(session)?;
        if let Some(user) = &user {
            if let Some(hooks) = &self.hooks {
                hooks.on_logout(user);
            }
        }
        if let Some(token) = session.get(&self.config.session_key) {
            self.storage.delete_token(&token)?;
        }
        session.remove(&self.config.session_key);
        Ok(())
    }

    /// Revoke every session of one user, across all devices.
    ///
    /// Fires `on_logout_forced` exactly once with the total removed
    /// count; if the caller's own session belonged to that user, it is
    /// cleared and `on_logout` fires for it as well.
    pub fn force_logout_user(
        &self,
        session: &mut dyn SessionStore,
        user_id: Uuid,
        reason: Option<&str>,
    ) -> AuthResult<u64> {
        // Resolve the caller's own session before the bulk delete
        // invalidates its token
        let own = match session.get(&self.config.session_key) {
            Some(token) => self.storage.find_by_token(&token)?,
            None => None,
        };

        let removed = self.storage.delete_tokens_by_user_id(user_id)?;

        if let Some(own_user) = own {
            if own_user.id() == Some(user_id) {
                if let Some(hooks) = &self.hooks {
                    hooks.on_logout(&own_user);
                }
                session.remove(&self.config.session_key);
            }
        }

        if let Some(hooks) = &self.hooks {
            hooks.on_logout_forced(user_id, reason, removed);
        }
        warn!(user_id = %user_id, removed, "forced logout");
        Ok(removed)
    }

    /// Revoke one specific token.
    ///
    /// The owner lookup is best-effort context for the hooks; an
    /// unresolvable owner never blocks the deletion itself.
    pub fn force_logout_token(
        &self,
        session: &mut dyn SessionStore,
        token: &str,
        reason: Option<&str>,
    ) -> AuthResult<u64> {
        let owner = self.storage.find_by_token(token)?;
        let removed = self.storage.delete_token(token)?;

        if session.get(&self.config.session_key).as_deref() == Some(token) {
            session.remove(&self.config.session_key);
            if let (Some(user), Some(hooks)) = (&owner, &self.hooks) {
                hooks.on_logout(user);
            }
        }

        if let Some(user_id) = owner.as_ref().and_then(User::id) {
            if let Some(hooks) = &self.hooks {
                hooks.on_logout_forced(user_id, reason, removed);
            }
            warn!(user_id = %user_id, removed, "forced logout of single token");
        }
        Ok(removed)
    }

    /// Revoke every session of the user registered under `email`.
    /// Returns 0 when no such user exists.
    pub fn force_logout_email(
        &self,
        session: &mut dyn SessionStore,
        email: &str,
        reason: Option<&str>,
    ) -> AuthResult<u64> {
        match self.storage.find_by_email(email)?.as_ref().and_then(User::id) {
            Some(user_id) => self.force_logout_user(session, user_id, reason),
            None => Ok(0),
        }
    }

    // ==================
    // Updates
    // ==================

    /// Apply attribute updates through storage.
    ///
    /// Not a gated operation: storage errors propagate natively as
    /// `AuthError::Storage`, never through the failure channel.
    /// `on_user_updated` receives exactly the update map's key set.
    pub fn update_user(&self, user: &User, updates: &Map<String, Value>) -> AuthResult<User> {
        let updated = self.storage.update_user(user, updates)?;
        if let Some(hooks) = &self.hooks {
            let changed: Vec<String> = updates.keys().cloned().collect();
            hooks.on_user_updated(&updated, &changed);
        }
        Ok(updated)
    }

    // ==================
    // Failure Channel
    // ==================

    /// Route one policy failure: notify the hook, then render per the
    /// configured policy. Never silent in any mode.
    fn fail<T>(
        &self,
        message: String,
        notify: impl FnOnce(&dyn AuthHooks, &AuthFailure),
    ) -> AuthResult<AuthOutcome<T>> {
        let failure = AuthFailure::new(message);
        if let Some(hooks) = &self.hooks {
            notify(hooks.as_ref(), &failure);
        }
        debug!(reason = %failure.message, "authentication denied");
        match self.config.failure_policy {
            FailurePolicy::Error => Err(AuthError::Denied(failure.message)),
            FailurePolicy::Message => Ok(AuthOutcome::Denied(failure.message)),
        }
    }
}

impl<S: Storage> std::fmt::Debug for Auth<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth").field("config", &self.config).finish()
    }
}

// ==================
// Tests
// ==================
