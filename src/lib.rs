//! latchkey - a session-token authentication core
//!
//! Registers users, authenticates credentials, issues and revokes
//! opaque bearer tokens, and lets the host application observe or veto
//! each lifecycle transition through a hook contract.
//!
//! Persistence, password hashing, and the session slot are reached
//! through traits; the crate ships in-memory implementations suitable
//! for tests and single-process hosts.

pub mod auth;
pub mod crypto;
pub mod errors;
pub mod hooks;
pub mod messages;
pub mod session;
pub mod storage;
pub mod user;

pub use auth::{Auth, AuthConfig, AuthOutcome, FailurePolicy, LoginCheck, RegisterCheck};
pub use crypto::{generate_token, Argon2Hasher, CredentialHasher};
pub use errors::{AuthError, AuthFailure, AuthResult, StorageError, StorageResult};
pub use hooks::{AuthHooks, GateDecision};
pub use messages::{DefaultMessages, MessageProvider};
pub use session::{MemorySession, SessionStore, TokenRecord};
pub use storage::{MemoryStorage, Storage};
pub use user::{HiddenKeys, User};
