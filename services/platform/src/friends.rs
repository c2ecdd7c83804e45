//! Friend relationships: a symmetric, de-duplicated graph with a
//! request/accept protocol
//!
//! Per pair: `ABSENT -> PENDING(inviter -> invitee) -> ACCEPTED`. A request
//! with no row invites; a request by the invitee while pending accepts; every
//! other request is a no-op. Removal returns any state to `ABSENT`.

use common::error::StoreError;
use common::locks::KeyedLocks;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PlatformConfig;
use crate::error::{PlatformError, PlatformResult};
use crate::models::{
    Direction, FriendEntry, FriendList, FriendRequestOutcome, Friendship, NoOpReason, Outcome,
    PairKey,
};
use crate::repositories::{FriendshipRepository, UserDirectory};

/// Friend graph service
///
/// Calls on the same pair are linearized; calls on different pairs run
/// concurrently.
#[derive(Clone)]
pub struct FriendGraph {
    repository: Arc<dyn FriendshipRepository>,
    directory: Arc<dyn UserDirectory>,
    locks: Arc<KeyedLocks<PairKey>>,
    conflict_retries: u32,
}

impl FriendGraph {
    /// Create a new friend graph
    pub fn new(
        repository: Arc<dyn FriendshipRepository>,
        directory: Arc<dyn UserDirectory>,
        config: &PlatformConfig,
    ) -> Self {
        Self {
            repository,
            directory,
            locks: Arc::new(KeyedLocks::new()),
            conflict_retries: config.conflict_retries,
        }
    }

    /// The relationship between two identities, in either order
    pub async fn get(&self, a: Uuid, b: Uuid) -> PlatformResult<Option<Friendship>> {
        Ok(self.repository.find(&PairKey::new(a, b)).await?)
    }

    /// Invite `target`, or accept `target`'s pending invitation
    pub async fn request(
        &self,
        requester: Uuid,
        target: Uuid,
    ) -> PlatformResult<FriendRequestOutcome> {
        if requester == target {
            return Ok(FriendRequestOutcome::NoOp(NoOpReason::SelfRequest));
        }

        let pair = PairKey::new(requester, target);
        let _guard = self.locks.lock(&pair).await;

        // A conflicting insert means another writer created the row first;
        // re-reading picks it up.
        for attempt in 0..=self.conflict_retries {
            let Some(mut friendship) = self.repository.find(&pair).await? else {
                let friendship = Friendship::invite(requester, target);
                match self.repository.save(&friendship).await {
                    Ok(()) => {
                        info!("Friend request {} -> {}", requester, target);
                        return Ok(FriendRequestOutcome::Invited(friendship));
                    }
                    Err(StoreError::Conflict(key)) => {
                        warn!("Insert conflict on {} (attempt {})", key, attempt + 1);
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                }
            };

            return match friendship.request_from(requester) {
                Ok(()) => {
                    self.repository.update(&friendship).await?;
                    info!("Friend request accepted {} -> {}", friendship.inviter, requester);
                    Ok(FriendRequestOutcome::Accepted(friendship))
                }
                Err(reason) => Ok(FriendRequestOutcome::NoOp(reason)),
            };
        }

        Err(PlatformError::Conflict(format!("friendship {}", pair)))
    }

    /// Remove the relationship between two identities, whatever its state
    pub async fn remove(&self, requester: Uuid, target: Uuid) -> PlatformResult<Outcome> {
        let pair = PairKey::new(requester, target);
        let _guard = self.locks.lock(&pair).await;

        let removed = self.repository.delete(&pair).await?;
        if removed {
            info!("Removed friendship {} by {}", pair, requester);
        }

        Ok(Outcome::from_changed(removed))
    }

    /// [`FriendGraph::request`] with the target given by username
    pub async fn request_by_username(
        &self,
        requester: Uuid,
        target_username: &str,
    ) -> PlatformResult<FriendRequestOutcome> {
        let target = self.resolve(target_username).await?;
        self.request(requester, target).await
    }

    /// [`FriendGraph::remove`] with the target given by username
    pub async fn remove_by_username(
        &self,
        requester: Uuid,
        target_username: &str,
    ) -> PlatformResult<Outcome> {
        let target = self.resolve(target_username).await?;
        self.remove(requester, target).await
    }

    /// Every relationship of `id` as seen from `id`
    ///
    /// Accepted rows are friends; pending rows are invitations, sent or
    /// received depending on who created them.
    pub async fn list(&self, id: Uuid) -> PlatformResult<FriendList> {
        let rows = self.repository.list_for(id).await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(other) = row.pair.other(id) else {
                continue;
            };
            let Some(profile) = self.directory.resolve_by_id(other).await? else {
                warn!("Friendship {} references unknown user {}", row.pair, other);
                continue;
            };

            entries.push(FriendEntry {
                user_id: other,
                username: profile.username,
                pending: row.pending,
                direction: if row.inviter == id {
                    Direction::Sent
                } else {
                    Direction::Received
                },
            });
        }
        entries.sort_by(|a, b| a.username.cmp(&b.username));

        Ok(FriendList { entries })
    }

    async fn resolve(&self, username: &str) -> PlatformResult<Uuid> {
        self.directory
            .resolve_by_username(username)
            .await?
            .ok_or_else(|| PlatformError::NotFound(format!("user {}", username)))
    }
}
