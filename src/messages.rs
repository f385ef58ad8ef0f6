//! # Failure Messages
//!
//! Maps semantic failure reasons to human-readable text. Swap the
//! provider at construction to localize every default message the core
//! can emit.

/// Provider of default failure text
///
/// Each accessor is pure: same reason, same string, no side effects.
pub trait MessageProvider: Send + Sync {
    fn user_already_exists(&self) -> String;
    fn password_hashing_failed(&self) -> String;
    fn invalid_credentials(&self) -> String;
    fn registration_blocked(&self) -> String;
    fn login_blocked(&self) -> String;
    fn user_not_found(&self) -> String;
}

/// Built-in English messages
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessages;

impl MessageProvider for DefaultMessages {
    fn user_already_exists(&self) -> String {
        "User with this email already exists.".to_string()
    }

    fn password_hashing_failed(&self) -> String {
        "Password hashing failed.".to_string()
    }

    fn invalid_credentials(&self) -> String {
        "Invalid email or password.".to_string()
    }

    fn registration_blocked(&self) -> String {
        "Registration blocked.".to_string()
    }

    fn login_blocked(&self) -> String {
        "Login blocked.".to_string()
    }

    fn user_not_found(&self) -> String {
        "User not found.".to_string()
    }
}
