//! Game model: board snapshot, ply history, clocks and lifecycle flags

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PlatformError, PlatformResult};
use crate::models::{Move, Ply, Side};
use crate::notation;

/// How a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The given participant won
    Winner(Uuid),
    /// No winner
    Draw,
}

/// Game entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    /// Serialized board as last supplied by the caller
    pub board: String,
    /// Encoded plies joined by [`notation::HISTORY_DELIMITER`]
    pub history: String,
    /// Number of plies played
    pub turn: u32,
    pub white_clock: u64,
    pub black_clock: u64,
    pub white_id: Uuid,
    pub black_id: Uuid,
    pub white_username: String,
    pub black_username: String,
    pub started: bool,
    pub ended: bool,
    /// `None` on an ended game is a draw
    pub winner: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Game {
    /// Start a game with both clocks at `initial_clock`
    pub fn new(
        white_id: Uuid,
        black_id: Uuid,
        white_username: impl Into<String>,
        black_username: impl Into<String>,
        initial_clock: u64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            board: String::new(),
            history: String::new(),
            turn: 0,
            white_clock: initial_clock,
            black_clock: initial_clock,
            white_id,
            black_id,
            white_username: white_username.into(),
            black_username: black_username.into(),
            started: true,
            ended: false,
            winner: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn ply_count(&self) -> u32 {
        self.turn
    }

    pub fn clock_of(&self, side: Side) -> u64 {
        match side {
            Side::White => self.white_clock,
            Side::Black => self.black_clock,
        }
    }

    fn clock_mut(&mut self, side: Side) -> &mut u64 {
        match side {
            Side::White => &mut self.white_clock,
            Side::Black => &mut self.black_clock,
        }
    }

    pub fn is_participant(&self, id: Uuid) -> bool {
        self.white_id == id || self.black_id == id
    }

    /// Side played by `username`
    ///
    /// A player facing themselves moves for whichever side is to move.
    pub fn side_of(&self, username: &str) -> Option<Side> {
        match (self.white_username == username, self.black_username == username) {
            (true, false) => Some(Side::White),
            (false, true) => Some(Side::Black),
            (true, true) => Some(Side::to_move(self.turn)),
            (false, false) => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.ended && self.winner.is_none()
    }

    /// Record a ply and the board it produced
    ///
    /// Nothing is modified unless the whole ply is accepted.
    pub fn append_move(&mut self, ply: &Ply, board: impl Into<String>) -> PlatformResult<()> {
        if self.ended {
            return Err(PlatformError::GameEnded(self.id));
        }

        let side = self.side_of(&ply.player).ok_or_else(|| {
            PlatformError::NotFound(format!("player {} in game {}", ply.player, self.id))
        })?;

        let remaining = self.clock_of(side);
        let left = remaining
            .checked_sub(ply.elapsed)
            .ok_or(PlatformError::ClockExhausted {
                side,
                remaining,
                elapsed: ply.elapsed,
            })?;
        let token = notation::encode(&ply.chess_move)?;

        notation::append_to_history(&mut self.history, &token);
        self.turn += 1;
        *self.clock_mut(side) = left;
        self.board = board.into();
        self.updated_at = Utc::now();

        Ok(())
    }

    /// End the game
    pub fn terminate(&mut self, termination: Termination) -> PlatformResult<()> {
        if self.ended {
            return Err(PlatformError::AlreadyEnded(self.id));
        }

        let winner = match termination {
            Termination::Winner(id) if self.is_participant(id) => Some(id),
            Termination::Winner(id) => {
                return Err(PlatformError::NotFound(format!(
                    "participant {} in game {}",
                    id, self.id
                )));
            }
            Termination::Draw => None,
        };

        self.ended = true;
        self.winner = winner;
        self.updated_at = Utc::now();

        Ok(())
    }

    /// Decode the stored ply history
    pub fn moves(&self) -> PlatformResult<Vec<Move>> {
        notation::decode_history(&self.history)
    }
}
