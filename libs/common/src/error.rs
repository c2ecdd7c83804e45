//! Custom error types for the common library
//!
//! This module defines the error taxonomy shared by every persistence
//! collaborator, whatever storage engine backs it.

use thiserror::Error;

/// Error returned by persistence collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record with the same key already exists
    #[error("Record already exists: {0}")]
    Conflict(String),

    /// The record to update does not exist
    #[error("Record not found: {0}")]
    Missing(String),

    /// The storage backend failed
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
