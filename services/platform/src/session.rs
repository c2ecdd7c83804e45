//! Session management: opaque tokens bound to usernames

use chrono::{DateTime, Utc};
use rand::{Rng, distributions::Alphanumeric};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::PlatformConfig;
use crate::error::{PlatformError, PlatformResult};
use crate::models::{Outcome, Session, session::token_hint};
use crate::repositories::SessionRepository;

/// Session manager for handling user sessions
///
/// Lookups never consider a session's age: the configured max age is only
/// handed to the boundary layer for the client-visible cookie.
#[derive(Clone)]
pub struct SessionManager {
    repository: Arc<dyn SessionRepository>,
    token_length: usize,
    advisory_max_age: Duration,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(repository: Arc<dyn SessionRepository>, config: &PlatformConfig) -> Self {
        Self {
            repository,
            token_length: config.token_length,
            advisory_max_age: config.session_max_age(),
        }
    }

    fn generate_token(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.token_length)
            .map(char::from)
            .collect()
    }

    /// Create a new session for a user and return its token
    pub async fn create(&self, username: &str) -> PlatformResult<String> {
        let session = Session::new(self.generate_token(), username.to_string());
        self.repository.save(&session).await?;

        info!(
            "Created session {}.. for user: {}",
            session.token_hint(),
            username
        );
        Ok(session.token)
    }

    /// Resolve a token to the username it is bound to
    pub async fn lookup(&self, token: &str) -> PlatformResult<String> {
        debug!("Looking up session {}..", token_hint(token));

        self.repository
            .find(token)
            .await?
            .map(|session| session.username)
            .ok_or_else(|| PlatformError::NotFound(format!("session {}..", token_hint(token))))
    }

    /// Delete a session; deleting an unknown token is a no-op
    pub async fn delete(&self, token: &str) -> PlatformResult<Outcome> {
        let removed = self.repository.delete(token).await?;

        info!(
            "Deleting session {}.. ({})",
            token_hint(token),
            if removed { "removed" } else { "absent" }
        );
        Ok(Outcome::from_changed(removed))
    }

    /// Delete every session of a user (forced logout)
    pub async fn delete_by_username(&self, username: &str) -> PlatformResult<Outcome> {
        let removed = self.repository.delete_by_username(username).await?;

        info!("Deleted {} session(s) for user: {}", removed, username);
        Ok(Outcome::from_changed(removed > 0))
    }

    /// Active sessions of a user, newest first
    pub async fn sessions_for(&self, username: &str) -> PlatformResult<Vec<Session>> {
        Ok(self.repository.find_by_username(username).await?)
    }

    /// Administrative expiry: drop sessions created before `cutoff`
    pub async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> PlatformResult<u64> {
        let removed = self.repository.delete_created_before(cutoff).await?;

        info!("Purged {} session(s) created before {}", removed, cutoff);
        Ok(removed)
    }

    /// Client-visible session lifetime, for the boundary layer only
    pub fn advisory_max_age(&self) -> Duration {
        self.advisory_max_age
    }
}
