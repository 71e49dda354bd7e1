//! Validation helpers for usernames and message content.
//!
//! Stateless predicates consumed by the session controller before any
//! network action. Failures are returned synchronously so presentation
//! layers can render inline feedback.

use thiserror::Error;

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 2;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 20;

/// Maximum message length, counted after trimming.
pub const MAX_MESSAGE_LENGTH: usize = 1000;

/// Rejection reasons for user-supplied input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Username is blank.
    #[error("Username cannot be empty")]
    EmptyUsername,

    /// Username is shorter than [`MIN_USERNAME_LENGTH`].
    #[error("Username must be at least {MIN_USERNAME_LENGTH} characters")]
    UsernameTooShort,

    /// Username is longer than [`MAX_USERNAME_LENGTH`].
    #[error("Username must be at most {MAX_USERNAME_LENGTH} characters")]
    UsernameTooLong,

    /// Username contains a character outside the allowed set.
    #[error("Username can only contain letters, numbers, underscores and spaces")]
    UsernameCharset,

    /// Message is blank after trimming.
    #[error("Message cannot be empty")]
    EmptyMessage,

    /// Message exceeds [`MAX_MESSAGE_LENGTH`] after trimming.
    #[error("Message is too long (max {MAX_MESSAGE_LENGTH} characters)")]
    MessageTooLong,
}

/// Check a username for well-formedness.
///
/// Usernames are 2-20 characters drawn from ASCII letters, digits,
/// underscore and space, and may not be blank.
///
/// # Errors
///
/// Returns the first violated constraint.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::EmptyUsername);
    }

    let length = username.chars().count();
    if length < MIN_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooShort);
    }
    if length > MAX_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooLong);
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ' ')
    {
        return Err(ValidationError::UsernameCharset);
    }

    Ok(())
}

/// Check message content for well-formedness.
///
/// Content must be non-empty after trimming and at most 1000 characters.
///
/// # Errors
///
/// Returns the first violated constraint.
pub fn validate_message(content: &str) -> Result<(), ValidationError> {
    let trimmed = content.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(ValidationError::MessageTooLong);
    }

    Ok(())
}
