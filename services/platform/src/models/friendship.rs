//! Friendship model and the per-pair request/accept state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical, order-independent key for a pair of identities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    low: Uuid,
    high: Uuid,
}

impl PairKey {
    /// Build the key for `{a, b}`; argument order does not matter
    pub fn new(a: Uuid, b: Uuid) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn low(&self) -> Uuid {
        self.low
    }

    pub fn high(&self) -> Uuid {
        self.high
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.low == id || self.high == id
    }

    /// The member of the pair that is not `id`
    pub fn other(&self, id: Uuid) -> Option<Uuid> {
        if self.low == id {
            Some(self.high)
        } else if self.high == id {
            Some(self.low)
        } else {
            None
        }
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.low, self.high)
    }
}

/// Friendship entity
///
/// Directional while pending (inviter to invitee), symmetric once accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friendship {
    pub pair: PairKey,
    pub inviter: Uuid,
    pub pending: bool,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

/// Why a friend request left the relationship untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoOpReason {
    /// The inviter asked again while the invitation is pending
    AlreadyInvited,
    /// The relationship is already accepted
    AlreadyFriends,
    /// Requester and target are the same identity
    SelfRequest,
}

impl Friendship {
    /// A pending invitation from `inviter` to `invitee`
    pub fn invite(inviter: Uuid, invitee: Uuid) -> Self {
        Self {
            pair: PairKey::new(inviter, invitee),
            inviter,
            pending: true,
            created_at: Utc::now(),
            accepted_at: None,
        }
    }

    /// The inviter
    pub fn user_a(&self) -> Uuid {
        self.inviter
    }

    /// The invitee
    pub fn user_b(&self) -> Uuid {
        // the pair always contains the inviter
        self.pair.other(self.inviter).unwrap_or(self.inviter)
    }

    pub fn is_accepted(&self) -> bool {
        !self.pending
    }

    /// Apply a friend request made by `caller`
    ///
    /// Only the invitee calling while pending moves the pair to accepted;
    /// every other call leaves it as is.
    pub fn request_from(&mut self, caller: Uuid) -> Result<(), NoOpReason> {
        if !self.pending {
            return Err(NoOpReason::AlreadyFriends);
        }
        if caller != self.user_b() {
            return Err(NoOpReason::AlreadyInvited);
        }

        self.pending = false;
        self.accepted_at = Some(Utc::now());
        Ok(())
    }
}

/// Direction of a relationship as seen by one of its members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The viewer sent the invitation
    Sent,
    /// The viewer received the invitation
    Received,
}

/// One row of a profile's friend list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendEntry {
    pub user_id: Uuid,
    pub username: String,
    pub pending: bool,
    pub direction: Direction,
}

/// Every relationship of one identity, sorted by username
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendList {
    pub entries: Vec<FriendEntry>,
}

impl FriendList {
    /// Accepted friends
    pub fn friends(&self) -> impl Iterator<Item = &FriendEntry> {
        self.entries.iter().filter(|entry| !entry.pending)
    }

    /// Outstanding invitations the viewer sent
    pub fn sent(&self) -> impl Iterator<Item = &FriendEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.pending && entry.direction == Direction::Sent)
    }

    /// Outstanding invitations the viewer received
    pub fn received(&self) -> impl Iterator<Item = &FriendEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.pending && entry.direction == Direction::Received)
    }
}
