//! Collaborator contracts consumed by the engines
//!
//! Implementations own storage; the engines only issue whole-entity
//! operations after computing new state. A successful `save`/`update` must be
//! durable before it returns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::StoreResult;
use uuid::Uuid;

use crate::models::{Friendship, Game, PairKey, Session, UserProfile};

pub mod memory;

pub use memory::{
    MemoryFriendshipRepository, MemoryGameRepository, MemorySessionRepository,
    MemoryUserDirectory,
};

/// Resolves between identities and display usernames
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn resolve_by_username(&self, username: &str) -> StoreResult<Option<Uuid>>;

    async fn resolve_by_id(&self, id: Uuid) -> StoreResult<Option<UserProfile>>;
}

/// Session persistence
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a session; `Conflict` if the token is taken
    async fn save(&self, session: &Session) -> StoreResult<()>;

    async fn find(&self, token: &str) -> StoreResult<Option<Session>>;

    /// Returns whether a session was removed
    async fn delete(&self, token: &str) -> StoreResult<bool>;

    /// Returns how many sessions were removed
    async fn delete_by_username(&self, username: &str) -> StoreResult<u64>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Vec<Session>>;

    /// Returns how many sessions were removed
    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64>;
}

/// Friendship persistence, keyed by the canonical pair
#[async_trait]
pub trait FriendshipRepository: Send + Sync {
    /// Insert a friendship; `Conflict` if the pair already has a row
    async fn save(&self, friendship: &Friendship) -> StoreResult<()>;

    /// Replace a friendship; `Missing` if the pair has no row
    async fn update(&self, friendship: &Friendship) -> StoreResult<()>;

    async fn find(&self, pair: &PairKey) -> StoreResult<Option<Friendship>>;

    /// Returns whether a row was removed
    async fn delete(&self, pair: &PairKey) -> StoreResult<bool>;

    /// Every row the identity is part of
    async fn list_for(&self, id: Uuid) -> StoreResult<Vec<Friendship>>;
}

/// Game persistence
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Insert a game; `Conflict` if the id is taken
    async fn save(&self, game: &Game) -> StoreResult<()>;

    /// Replace a game; `Missing` if it does not exist
    async fn update(&self, game: &Game) -> StoreResult<()>;

    async fn find(&self, id: Uuid) -> StoreResult<Option<Game>>;

    /// Games the identity plays in, newest first
    async fn list_for_player(&self, id: Uuid) -> StoreResult<Vec<Game>>;
}
