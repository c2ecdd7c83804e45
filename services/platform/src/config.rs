//! Platform configuration

use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

/// Shortest session token accepted, in alphanumeric characters
pub const MIN_TOKEN_LENGTH: usize = 32;

/// Platform configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Length of generated session tokens
    pub token_length: usize,
    /// Client-visible session lifetime in seconds; advisory, never enforced
    pub session_max_age_seconds: u64,
    /// Default starting clock per side, in time units
    pub initial_clock: u64,
    /// Read-then-write retries after a friendship insert conflict
    pub conflict_retries: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            token_length: 48,
            session_max_age_seconds: 2_592_000, // 30 days
            initial_clock: 600_000,
            conflict_retries: 3,
        }
    }
}

impl PlatformConfig {
    /// Create a new PlatformConfig from environment variables
    ///
    /// # Environment Variables
    /// - `CHESS_TOKEN_LENGTH`: Session token length (default: 48, minimum: 32)
    /// - `CHESS_SESSION_MAX_AGE_SECONDS`: Advisory session lifetime (default: 2592000)
    /// - `CHESS_INITIAL_CLOCK`: Default starting clock per side (default: 600000)
    /// - `CHESS_CONFLICT_RETRIES`: Friendship conflict retries (default: 3)
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("CHESS").try_parsing(true))
            .build()?;

        let config: PlatformConfig = settings.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject values the engines cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.token_length < MIN_TOKEN_LENGTH {
            anyhow::bail!(
                "Session token length must be at least {} characters, got {}",
                MIN_TOKEN_LENGTH,
                self.token_length
            );
        }

        Ok(())
    }

    /// Advisory session lifetime for the boundary layer
    pub fn session_max_age(&self) -> Duration {
        Duration::from_secs(self.session_max_age_seconds)
    }
}
