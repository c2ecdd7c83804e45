//! Custom error types for the platform engines

use common::error::StoreError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Side;

/// Error surfaced by the session, friendship, notation and game engines
///
/// Every variant is a local, recoverable condition. Mapping to a response is
/// left to the boundary layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// A session, identity, friendship or game does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Move notation could not be decoded
    #[error("Malformed notation: {0}")]
    MalformedNotation(String),

    /// The acting side does not have enough time left for the ply
    #[error("Clock exhausted for {side}: {remaining} remaining, {elapsed} spent")]
    ClockExhausted {
        side: Side,
        remaining: u64,
        elapsed: u64,
    },

    /// A move was submitted to a terminated game
    #[error("Game {0} has ended")]
    GameEnded(Uuid),

    /// A terminated game was terminated again
    #[error("Game {0} has already ended")]
    AlreadyEnded(Uuid),

    /// A concurrent writer created the same record first
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Input rejected before reaching storage
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The persistence collaborator failed
    #[error("Storage error: {0}")]
    Storage(#[source] StoreError),
}

impl PlatformError {
    /// Whether the error stems from the caller's request rather than the backend
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PlatformError::Storage(_))
    }

    /// Whether repeating the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlatformError::Conflict(_))
    }
}

impl From<StoreError> for PlatformError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(key) => PlatformError::Conflict(key),
            StoreError::Missing(key) => PlatformError::NotFound(key),
            backend @ StoreError::Backend(_) => PlatformError::Storage(backend),
        }
    }
}

/// Type alias for platform results
pub type PlatformResult<T> = Result<T, PlatformError>;
