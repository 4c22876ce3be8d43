//! Rules for the minimal user directory.

use crate::error::CoreError;

/// Maximum length of a username.
pub const MAX_USERNAME_LENGTH: usize = 64;

/// Username created at startup so the service is usable without signup.
pub const DEMO_USERNAME: &str = "demo_user";

/// Validate a username: non-blank after trimming and within length.
pub fn validate_username(username: &str) -> Result<(), CoreError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Username is required".into()));
    }
    if trimmed.chars().count() > MAX_USERNAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Username must be at most {MAX_USERNAME_LENGTH} characters"
        )));
    }
    Ok(())
}
