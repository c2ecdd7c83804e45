//! Game aggregate service
//!
//! Wraps the pure state transitions on [`Game`] with per-game serialization
//! and persistence. Concurrent calls for one game apply in arrival order,
//! each observing the turn and clocks left by the previous one.

use common::locks::KeyedLocks;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::PlatformConfig;
use crate::error::{PlatformError, PlatformResult};
use crate::models::{Game, Move, Ply, Side, Termination};
use crate::repositories::{GameRepository, UserDirectory};

/// Game service
#[derive(Clone)]
pub struct GameService {
    repository: Arc<dyn GameRepository>,
    directory: Arc<dyn UserDirectory>,
    locks: Arc<KeyedLocks<Uuid>>,
    initial_clock: u64,
}

impl GameService {
    /// Create a new game service
    pub fn new(
        repository: Arc<dyn GameRepository>,
        directory: Arc<dyn UserDirectory>,
        config: &PlatformConfig,
    ) -> Self {
        Self {
            repository,
            directory,
            locks: Arc::new(KeyedLocks::new()),
            initial_clock: config.initial_clock,
        }
    }

    /// Start a game with explicit participants and starting clock
    pub async fn create(
        &self,
        white_id: Uuid,
        black_id: Uuid,
        white_username: &str,
        black_username: &str,
        initial_clock: u64,
    ) -> PlatformResult<Game> {
        let game = Game::new(
            white_id,
            black_id,
            white_username,
            black_username,
            initial_clock,
        );
        self.repository.save(&game).await?;

        info!(
            "Started game {}: {} (white) vs {} (black), clock {}",
            game.id, white_username, black_username, initial_clock
        );
        Ok(game)
    }

    /// Start a game between two registered users with the default clock
    pub async fn start_between(&self, white_id: Uuid, black_id: Uuid) -> PlatformResult<Game> {
        let white = self.username_of(white_id).await?;
        let black = self.username_of(black_id).await?;

        self.create(white_id, black_id, &white, &black, self.initial_clock)
            .await
    }

    /// Record a ply and the board snapshot it produced
    pub async fn append_move(
        &self,
        game_id: Uuid,
        ply: &Ply,
        board: &str,
    ) -> PlatformResult<Game> {
        // held through load and update; only callers for this game wait
        let _guard = self.locks.lock(&game_id).await;

        let mut game = self.load(game_id).await?;
        game.append_move(ply, board)?;
        self.repository.update(&game).await?;

        debug!(
            "Game {} ply {} by {}: {:?}",
            game_id, game.turn, ply.player, ply.chess_move
        );
        Ok(game)
    }

    /// End a game with a winner or as a draw
    pub async fn terminate(
        &self,
        game_id: Uuid,
        termination: Termination,
    ) -> PlatformResult<Game> {
        let _guard = self.locks.lock(&game_id).await;

        let mut game = self.load(game_id).await?;
        game.terminate(termination)?;
        self.repository.update(&game).await?;

        match game.winner {
            Some(winner) => info!("Game {} ended, winner {}", game_id, winner),
            None => info!("Game {} ended in a draw", game_id),
        }
        Ok(game)
    }

    pub async fn get(&self, game_id: Uuid) -> PlatformResult<Game> {
        self.load(game_id).await
    }

    /// Number of plies played
    pub async fn ply_count(&self, game_id: Uuid) -> PlatformResult<u32> {
        Ok(self.load(game_id).await?.ply_count())
    }

    /// Remaining time of one side
    pub async fn clock_of(&self, game_id: Uuid, side: Side) -> PlatformResult<u64> {
        Ok(self.load(game_id).await?.clock_of(side))
    }

    /// Decoded ply history
    pub async fn history(&self, game_id: Uuid) -> PlatformResult<Vec<Move>> {
        self.load(game_id).await?.moves()
    }

    /// Games a user plays in, newest first
    pub async fn games_for(&self, player_id: Uuid) -> PlatformResult<Vec<Game>> {
        Ok(self.repository.list_for_player(player_id).await?)
    }

    async fn load(&self, game_id: Uuid) -> PlatformResult<Game> {
        self.repository
            .find(game_id)
            .await?
            .ok_or_else(|| PlatformError::NotFound(format!("game {}", game_id)))
    }

    async fn username_of(&self, id: Uuid) -> PlatformResult<String> {
        self.directory
            .resolve_by_id(id)
            .await?
            .map(|profile| profile.username)
            .ok_or_else(|| PlatformError::NotFound(format!("user {}", id)))
    }
}
