//! Session model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session entity binding an opaque token to a username
///
/// No expiry is stored: the client-visible lifetime is advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: String, username: String) -> Self {
        Self {
            token,
            username,
            created_at: Utc::now(),
        }
    }

    /// Token prefix safe to write to logs
    pub fn token_hint(&self) -> &str {
        token_hint(&self.token)
    }
}

/// First characters of a token, for log lines
pub fn token_hint(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(6)
        .map(|(idx, _)| idx)
        .unwrap_or(token.len());
    &token[..end]
}
