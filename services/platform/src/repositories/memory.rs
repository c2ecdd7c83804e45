//! In-memory collaborators
//!
//! Suitable for tests and for embedding the engines without a database.
//! Each repository is cheap to clone and shares its map between clones.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use super::{FriendshipRepository, GameRepository, SessionRepository, UserDirectory};
use crate::error::{PlatformError, PlatformResult};
use crate::models::{Friendship, Game, NewUser, PairKey, Session, User, UserProfile};
use crate::validation::{validate_email, validate_username};

/// In-memory user directory with a registration path
#[derive(Debug, Clone, Default)]
pub struct MemoryUserDirectory {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new user
    ///
    /// Usernames and emails must be well-formed and unique.
    pub async fn register(&self, new_user: NewUser) -> PlatformResult<User> {
        validate_username(&new_user.username)?;
        validate_email(&new_user.email)?;

        let mut users = self.users.lock().await;

        if users.values().any(|u| u.username == new_user.username) {
            return Err(PlatformError::Conflict(format!(
                "username {}",
                new_user.username
            )));
        }
        if users.values().any(|u| u.email == new_user.email) {
            return Err(PlatformError::Conflict(format!("email {}", new_user.email)));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            salt: new_user.salt,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());

        info!("Registered user: {}", user.username);
        Ok(user)
    }

    /// Find a full user record by username
    pub async fn find_by_username(&self, username: &str) -> Option<User> {
        let users = self.users.lock().await;
        users.values().find(|u| u.username == username).cloned()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn resolve_by_username(&self, username: &str) -> StoreResult<Option<Uuid>> {
        let users = self.users.lock().await;
        Ok(users.values().find(|u| u.username == username).map(|u| u.id))
    }

    async fn resolve_by_id(&self, id: Uuid) -> StoreResult<Option<UserProfile>> {
        let users = self.users.lock().await;
        Ok(users.get(&id).map(UserProfile::from))
    }
}

/// In-memory session repository
#[derive(Debug, Clone, Default)]
pub struct MemorySessionRepository {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn save(&self, session: &Session) -> StoreResult<()> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&session.token) {
            return Err(StoreError::Conflict(format!(
                "session {}",
                session.token_hint()
            )));
        }
        sessions.insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn find(&self, token: &str) -> StoreResult<Option<Session>> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.get(token).cloned())
    }

    async fn delete(&self, token: &str) -> StoreResult<bool> {
        let mut sessions = self.sessions.lock().await;
        Ok(sessions.remove(token).is_some())
    }

    async fn delete_by_username(&self, username: &str) -> StoreResult<u64> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.username != username);
        Ok((before - sessions.len()) as u64)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Vec<Session>> {
        let sessions = self.sessions.lock().await;
        let mut found: Vec<Session> = sessions
            .values()
            .filter(|session| session.username == username)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.created_at >= cutoff);
        Ok((before - sessions.len()) as u64)
    }
}

/// In-memory friendship repository
#[derive(Debug, Clone, Default)]
pub struct MemoryFriendshipRepository {
    rows: Arc<Mutex<HashMap<PairKey, Friendship>>>,
}

impl MemoryFriendshipRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows
    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

#[async_trait]
impl FriendshipRepository for MemoryFriendshipRepository {
    async fn save(&self, friendship: &Friendship) -> StoreResult<()> {
        let mut rows = self.rows.lock().await;
        if rows.contains_key(&friendship.pair) {
            return Err(StoreError::Conflict(format!("friendship {}", friendship.pair)));
        }
        rows.insert(friendship.pair, friendship.clone());
        Ok(())
    }

    async fn update(&self, friendship: &Friendship) -> StoreResult<()> {
        let mut rows = self.rows.lock().await;
        match rows.get_mut(&friendship.pair) {
            Some(row) => {
                *row = friendship.clone();
                Ok(())
            }
            None => Err(StoreError::Missing(format!("friendship {}", friendship.pair))),
        }
    }

    async fn find(&self, pair: &PairKey) -> StoreResult<Option<Friendship>> {
        let rows = self.rows.lock().await;
        Ok(rows.get(pair).cloned())
    }

    async fn delete(&self, pair: &PairKey) -> StoreResult<bool> {
        let mut rows = self.rows.lock().await;
        Ok(rows.remove(pair).is_some())
    }

    async fn list_for(&self, id: Uuid) -> StoreResult<Vec<Friendship>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .values()
            .filter(|row| row.pair.contains(id))
            .cloned()
            .collect())
    }
}

/// In-memory game repository
#[derive(Debug, Clone, Default)]
pub struct MemoryGameRepository {
    games: Arc<Mutex<HashMap<Uuid, Game>>>,
}

impl MemoryGameRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameRepository for MemoryGameRepository {
    async fn save(&self, game: &Game) -> StoreResult<()> {
        let mut games = self.games.lock().await;
        if games.contains_key(&game.id) {
            return Err(StoreError::Conflict(format!("game {}", game.id)));
        }
        games.insert(game.id, game.clone());
        Ok(())
    }

    async fn update(&self, game: &Game) -> StoreResult<()> {
        let mut games = self.games.lock().await;
        match games.get_mut(&game.id) {
            Some(stored) => {
                *stored = game.clone();
                Ok(())
            }
            None => Err(StoreError::Missing(format!("game {}", game.id))),
        }
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Game>> {
        let games = self.games.lock().await;
        Ok(games.get(&id).cloned())
    }

    async fn list_for_player(&self, id: Uuid) -> StoreResult<Vec<Game>> {
        let games = self.games.lock().await;
        let mut found: Vec<Game> = games
            .values()
            .filter(|game| game.is_participant(id))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: "hash".to_string(),
            salt: "salt".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_and_resolve() {
        let directory = MemoryUserDirectory::new();
        let user = directory.register(new_user("alice")).await.unwrap();

        assert_eq!(
            directory.resolve_by_username("alice").await.unwrap(),
            Some(user.id)
        );
        let profile = directory.resolve_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(profile.username, "alice");
        assert_eq!(profile.email, "alice@example.com");

        assert_eq!(directory.resolve_by_username("bob").await.unwrap(), None);
        assert_eq!(directory.resolve_by_id(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_bad_input() {
        let directory = MemoryUserDirectory::new();
        directory.register(new_user("alice")).await.unwrap();

        let err = directory.register(new_user("alice")).await.unwrap_err();
        assert!(matches!(err, PlatformError::Conflict(_)));

        let err = directory.register(new_user("a b")).await.unwrap_err();
        assert!(matches!(err, PlatformError::Validation(_)));

        let mut same_email = new_user("alice2");
        same_email.email = "alice@example.com".to_string();
        let err = directory.register(same_email).await.unwrap_err();
        assert!(matches!(err, PlatformError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_friendship_save_conflicts_on_either_order() {
        let repo = MemoryFriendshipRepository::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        repo.save(&Friendship::invite(a, b)).await.unwrap();
        let err = repo.save(&Friendship::invite(b, a)).await.unwrap_err();

        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_missing_game() {
        let repo = MemoryGameRepository::new();
        let game = Game::new(Uuid::new_v4(), Uuid::new_v4(), "a", "b", 10);

        let err = repo.update(&game).await.unwrap_err();
        assert!(matches!(err, StoreError::Missing(_)));
    }
}
