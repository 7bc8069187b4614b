//! Field validation for incoming forum data.
//!
//! Lengths are counted in characters, not bytes.

use crate::error::{ForumError, ForumResult};

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 50;
const PASSWORD_MIN: usize = 8;
const TITLE_MAX: usize = 255;

/// Usernames are 3 to 50 characters with no surrounding whitespace.
pub fn username(value: &str) -> ForumResult<()> {
    let len = value.chars().count();
    if value.trim() != value || !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(ForumError::invalid(format!(
            "username must be {USERNAME_MIN} to {USERNAME_MAX} characters without surrounding spaces"
        )));
    }
    Ok(())
}

/// A deliberately small email check: one `@`, a non-empty local part, and a
/// dotted domain with no empty labels.
pub fn email(value: &str) -> ForumResult<()> {
    let invalid = || ForumError::invalid("email address is not valid");
    if value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

/// Passwords need at least 8 characters.
pub fn password(value: &str) -> ForumResult<()> {
    if value.chars().count() < PASSWORD_MIN {
        return Err(ForumError::invalid(format!(
            "password must be at least {PASSWORD_MIN} characters"
        )));
    }
    Ok(())
}

/// Reject empty or whitespace-only values, returning the trimmed text.
pub fn required<'a>(field: &str, value: &'a str) -> ForumResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ForumError::invalid(format!("{field} is required")));
    }
    Ok(trimmed)
}

/// A required title of at most 255 characters, returned trimmed.
pub fn title(value: &str) -> ForumResult<&str> {
    let trimmed = required("title", value)?;
    if trimmed.chars().count() > TITLE_MAX {
        return Err(ForumError::invalid(format!(
            "title must be at most {TITLE_MAX} characters"
        )));
    }
    Ok(trimmed)
}
