//! Platform models

pub mod chess_move;
pub mod friendship;
pub mod game;
pub mod session;
pub mod user;

// Re-export for convenience
pub use chess_move::{Mark, Move, Ply, Side, Square};
pub use friendship::{Direction, FriendEntry, FriendList, Friendship, NoOpReason, PairKey};
pub use game::{Game, Termination};
pub use session::Session;
pub use user::{NewUser, User, UserProfile};

use serde::{Deserialize, Serialize};

/// Result of an idempotent removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// State changed
    Applied,
    /// Nothing to do
    NoOp,
}

impl Outcome {
    pub fn from_changed(changed: bool) -> Self {
        if changed { Outcome::Applied } else { Outcome::NoOp }
    }
}

/// Result of a friend request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendRequestOutcome {
    /// A new pending invitation was created
    Invited(Friendship),
    /// The invitee accepted a pending invitation
    Accepted(Friendship),
    /// The relationship was left as is
    NoOp(NoOpReason),
}
