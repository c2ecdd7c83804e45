//! Registration input validation
//!
//! Usernames travel inside plies, session rows and log lines, so they are kept
//! to a plain handle alphabet with no whitespace (and so never contain
//! [`crate::notation::HISTORY_DELIMITER`]).

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{PlatformError, PlatformResult};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 20;
pub const EMAIL_MAX_LEN: usize = 254;

fn invalid(message: impl Into<String>) -> PlatformError {
    PlatformError::Validation(message.into())
}

/// Check a player handle: ASCII letters, digits, `_` or `-`, starting with a letter
pub fn validate_username(username: &str) -> PlatformResult<()> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(invalid(format!(
            "username {:?} must be {} to {} characters",
            username, USERNAME_MIN_LEN, USERNAME_MAX_LEN
        )));
    }

    static HANDLE: OnceLock<Option<Regex>> = OnceLock::new();
    let handle = HANDLE
        .get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").ok())
        .as_ref()
        .ok_or_else(|| invalid("username pattern unavailable"))?;

    if !handle.is_match(username) {
        return Err(invalid(format!(
            "username {:?} must start with a letter and use only letters, digits, '_' or '-'",
            username
        )));
    }

    Ok(())
}

/// Check a contact address: one `@`, a dotted domain, no whitespace
pub fn validate_email(email: &str) -> PlatformResult<()> {
    if email.len() > EMAIL_MAX_LEN {
        return Err(invalid(format!("email is longer than {} bytes", EMAIL_MAX_LEN)));
    }

    static ADDRESS: OnceLock<Option<Regex>> = OnceLock::new();
    let address = ADDRESS
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[A-Za-z]{2,}$").ok())
        .as_ref()
        .ok_or_else(|| invalid("email pattern unavailable"))?;

    if !address.is_match(email) {
        return Err(invalid(format!("{:?} is not an email address", email)));
    }

    Ok(())
}
