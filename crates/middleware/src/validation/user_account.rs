use app_error::{AppError, AppResult};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Local part, an '@', then a dotted domain ending in a 2+ letter TLD
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"(?i)^[a-z0-9_+\-]([a-z0-9_+.\-]*[a-z0-9_+\-])?@[a-z0-9]+([\-.][a-z0-9]+)*\.[a-z]{2,}$"
    ).unwrap();
}

const MAX_FIELD_LENGTH: usize = 254;

/// Validates a username
pub fn validate_username(username: &str) -> AppResult<()> {
    if username.trim().is_empty() {
        return Err(AppError::validation("username", "cannot be empty"));
    }

    if username.len() > MAX_FIELD_LENGTH {
        return Err(AppError::validation("username", "is too long"));
    }

    Ok(())
}

/// Validates an email address
pub fn validate_email(email: &str) -> AppResult<()> {
    if email.trim().is_empty() {
        return Err(AppError::validation("email", "cannot be empty"));
    }

    if email.len() > MAX_FIELD_LENGTH || !EMAIL_REGEX.is_match(email) {
        return Err(AppError::validation("email", "value is not a valid email address"));
    }

    Ok(())
}

/// Validates a password. Only emptiness is checked; strength rules are not enforced.
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.is_empty() {
        return Err(AppError::validation("password", "cannot be empty"));
    }

    Ok(())
}
