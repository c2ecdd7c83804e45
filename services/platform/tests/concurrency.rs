//! Concurrency tests for the friend graph and game service
//!
//! These run on a multi-threaded runtime so same-key calls genuinely race.

use async_trait::async_trait;
use common::error::{StoreError, StoreResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use uuid::Uuid;

use platform::config::PlatformConfig;
use platform::friends::FriendGraph;
use platform::game::GameService;
use platform::models::{FriendRequestOutcome, Friendship, Game, NewUser, PairKey, Ply, Side};
use platform::repositories::{
    FriendshipRepository, GameRepository, MemoryFriendshipRepository, MemoryGameRepository,
    MemoryUserDirectory,
};
use platform::PlatformError;

async fn register(directory: &MemoryUserDirectory, name: &str) -> Uuid {
    directory
        .register(NewUser {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            password_hash: String::new(),
            salt: String::new(),
        })
        .await
        .unwrap()
        .id
}

fn ply(notation: &str, elapsed: u64, player: &str) -> Ply {
    Ply::new(notation.parse().unwrap(), elapsed, player)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_accepts_apply_once() {
    let directory = MemoryUserDirectory::new();
    let alice = register(&directory, "alice").await;
    let bob = register(&directory, "bob").await;
    let rows = MemoryFriendshipRepository::new();
    let graph = FriendGraph::new(
        Arc::new(rows.clone()),
        Arc::new(directory),
        &PlatformConfig::default(),
    );

    graph.request(alice, bob).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let graph = graph.clone();
        let (from, to) = if i % 2 == 0 { (bob, alice) } else { (alice, bob) };
        handles.push(tokio::spawn(async move { graph.request(from, to).await }));
    }

    let mut accepted = 0;
    for handle in handles {
        if let FriendRequestOutcome::Accepted(_) = handle.await.unwrap().unwrap() {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 1);
    assert!(graph.get(alice, bob).await.unwrap().unwrap().is_accepted());
    assert_eq!(rows.len().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_crossing_invitations_leave_one_row() {
    let directory = MemoryUserDirectory::new();
    let alice = register(&directory, "alice").await;
    let bob = register(&directory, "bob").await;
    let rows = MemoryFriendshipRepository::new();
    let graph = FriendGraph::new(
        Arc::new(rows.clone()),
        Arc::new(directory),
        &PlatformConfig::default(),
    );

    let (first, second) = tokio::join!(
        tokio::spawn({
            let graph = graph.clone();
            async move { graph.request(alice, bob).await }
        }),
        tokio::spawn({
            let graph = graph.clone();
            async move { graph.request(bob, alice).await }
        }),
    );
    let outcomes = [first.unwrap().unwrap(), second.unwrap().unwrap()];

    let invited = outcomes
        .iter()
        .filter(|o| matches!(o, FriendRequestOutcome::Invited(_)))
        .count();
    let accepted = outcomes
        .iter()
        .filter(|o| matches!(o, FriendRequestOutcome::Accepted(_)))
        .count();
    assert_eq!((invited, accepted), (1, 1));
    assert_eq!(rows.len().await, 1);
}

/// Repository where another process wins the first insert race
struct RacingRepository {
    inner: MemoryFriendshipRepository,
    rival: Uuid,
    conflicts_left: AtomicU32,
}

#[async_trait]
impl FriendshipRepository for RacingRepository {
    async fn save(&self, friendship: &Friendship) -> StoreResult<()> {
        if self.conflicts_left.load(Ordering::SeqCst) > 0 {
            self.conflicts_left.fetch_sub(1, Ordering::SeqCst);
            let inviter = friendship.pair.other(self.rival).unwrap_or(friendship.inviter);
            let _ = self.inner.save(&Friendship::invite(self.rival, inviter)).await;
            return Err(StoreError::Conflict(format!("friendship {}", friendship.pair)));
        }
        self.inner.save(friendship).await
    }

    async fn update(&self, friendship: &Friendship) -> StoreResult<()> {
        self.inner.update(friendship).await
    }

    async fn find(&self, pair: &PairKey) -> StoreResult<Option<Friendship>> {
        self.inner.find(pair).await
    }

    async fn delete(&self, pair: &PairKey) -> StoreResult<bool> {
        self.inner.delete(pair).await
    }

    async fn list_for(&self, id: Uuid) -> StoreResult<Vec<Friendship>> {
        self.inner.list_for(id).await
    }
}

#[tokio::test]
async fn test_insert_conflict_rereads_and_accepts() {
    let directory = MemoryUserDirectory::new();
    let alice = register(&directory, "alice").await;
    let bob = register(&directory, "bob").await;
    let repository = RacingRepository {
        inner: MemoryFriendshipRepository::new(),
        rival: bob,
        conflicts_left: AtomicU32::new(1),
    };
    let graph = FriendGraph::new(
        Arc::new(repository),
        Arc::new(directory),
        &PlatformConfig::default(),
    );

    // bob's invitation lands first; alice's insert conflicts and becomes an accept
    let outcome = graph.request(alice, bob).await.unwrap();

    let FriendRequestOutcome::Accepted(row) = outcome else {
        panic!("expected accept after conflict, got {:?}", outcome);
    };
    assert_eq!(row.user_a(), bob);
    assert!(row.is_accepted());
}

/// Repository whose inserts always conflict without leaving a row behind
struct AlwaysConflicting(MemoryFriendshipRepository);

#[async_trait]
impl FriendshipRepository for AlwaysConflicting {
    async fn save(&self, friendship: &Friendship) -> StoreResult<()> {
        Err(StoreError::Conflict(format!("friendship {}", friendship.pair)))
    }

    async fn update(&self, friendship: &Friendship) -> StoreResult<()> {
        self.0.update(friendship).await
    }

    async fn find(&self, pair: &PairKey) -> StoreResult<Option<Friendship>> {
        self.0.find(pair).await
    }

    async fn delete(&self, pair: &PairKey) -> StoreResult<bool> {
        self.0.delete(pair).await
    }

    async fn list_for(&self, id: Uuid) -> StoreResult<Vec<Friendship>> {
        self.0.list_for(id).await
    }
}

#[tokio::test]
async fn test_persistent_conflict_is_surfaced() {
    let directory = MemoryUserDirectory::new();
    let alice = register(&directory, "alice").await;
    let bob = register(&directory, "bob").await;
    let graph = FriendGraph::new(
        Arc::new(AlwaysConflicting(MemoryFriendshipRepository::new())),
        Arc::new(directory),
        &PlatformConfig::default(),
    );

    let err = graph.request(alice, bob).await.unwrap_err();
    assert!(matches!(err, PlatformError::Conflict(_)));
    assert!(err.is_retryable());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_moves_are_serialized() {
    let directory = MemoryUserDirectory::new();
    let white = register(&directory, "white_player").await;
    let black = register(&directory, "black_player").await;
    let games = GameService::new(
        Arc::new(MemoryGameRepository::new()),
        Arc::new(directory),
        &PlatformConfig::default(),
    );
    let game = games
        .create(white, black, "white_player", "black_player", 1_000)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..20u64 {
        let games = games.clone();
        let (notation, player) = if i % 2 == 0 {
            ("Ng1f3", "white_player")
        } else {
            ("ng8f6", "black_player")
        };
        handles.push(tokio::spawn(async move {
            games
                .append_move(game.id, &ply(notation, i, player), &format!("board-{}", i))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = games.get(game.id).await.unwrap();
    assert_eq!(stored.turn, 20);
    assert_eq!(stored.history.split(' ').count(), 20);
    // white spent 0+2+..+18, black 1+3+..+19
    assert_eq!(stored.clock_of(Side::White), 1_000 - 90);
    assert_eq!(stored.clock_of(Side::Black), 1_000 - 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_moves_observe_updated_clock() {
    let directory = MemoryUserDirectory::new();
    let white = register(&directory, "white_player").await;
    let black = register(&directory, "black_player").await;
    let games = GameService::new(
        Arc::new(MemoryGameRepository::new()),
        Arc::new(directory),
        &PlatformConfig::default(),
    );
    let game = games
        .create(white, black, "white_player", "black_player", 10)
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        tokio::spawn({
            let games = games.clone();
            async move {
                games
                    .append_move(game.id, &ply("Pe2e4", 6, "white_player"), "a")
                    .await
            }
        }),
        tokio::spawn({
            let games = games.clone();
            async move {
                games
                    .append_move(game.id, &ply("Pd2d4", 6, "white_player"), "b")
                    .await
            }
        }),
    );
    let results = [first.unwrap(), second.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(PlatformError::ClockExhausted {
            side: Side::White,
            remaining: 4,
            elapsed: 6,
        })
    )));

    let stored = games.get(game.id).await.unwrap();
    assert_eq!(stored.turn, 1);
    assert_eq!(stored.clock_of(Side::White), 4);
}

/// Game store whose next update for one game hangs until released
struct StallingGameRepository {
    inner: MemoryGameRepository,
    stalled: std::sync::Mutex<Option<Uuid>>,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl GameRepository for StallingGameRepository {
    async fn save(&self, game: &Game) -> StoreResult<()> {
        self.inner.save(game).await
    }

    async fn update(&self, game: &Game) -> StoreResult<()> {
        let stalled = {
            let mut slot = self.stalled.lock().unwrap();
            if *slot == Some(game.id) { slot.take().is_some() } else { false }
        };
        if stalled {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.update(game).await
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Game>> {
        self.inner.find(id).await
    }

    async fn list_for_player(&self, id: Uuid) -> StoreResult<Vec<Game>> {
        self.inner.list_for_player(id).await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stalled_write_blocks_only_its_game() {
    let directory = MemoryUserDirectory::new();
    let white = register(&directory, "white_player").await;
    let black = register(&directory, "black_player").await;
    let repository = Arc::new(StallingGameRepository {
        inner: MemoryGameRepository::new(),
        stalled: std::sync::Mutex::new(None),
        entered: Notify::new(),
        release: Notify::new(),
    });
    let games = GameService::new(
        repository.clone(),
        Arc::new(directory),
        &PlatformConfig::default(),
    );
    let slow = games.start_between(white, black).await.unwrap();
    let fast = games.start_between(white, black).await.unwrap();
    *repository.stalled.lock().unwrap() = Some(slow.id);

    let stalled_move = tokio::spawn({
        let games = games.clone();
        async move {
            games
                .append_move(slow.id, &ply("Pe2e4", 1, "white_player"), "slow")
                .await
        }
    });
    repository.entered.notified().await;

    // another game goes through while the first one's write hangs
    let moved = tokio::time::timeout(
        Duration::from_secs(5),
        games.append_move(fast.id, &ply("Pd2d4", 1, "white_player"), "fast"),
    )
    .await
    .expect("other game must not wait on the stalled write")
    .unwrap();
    assert_eq!(moved.turn, 1);

    // a second move on the stalled game queues behind the guard
    let queued = tokio::spawn({
        let games = games.clone();
        async move {
            games
                .append_move(slow.id, &ply("pe7e5", 1, "black_player"), "slow-2")
                .await
        }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!queued.is_finished());

    repository.release.notify_one();
    stalled_move.await.unwrap().unwrap();
    let game = queued.await.unwrap().unwrap();
    assert_eq!(game.turn, 2);
    assert_eq!(game.history, "Pe2e4 pe7e5");
}
