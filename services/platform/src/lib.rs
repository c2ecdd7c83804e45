//! Chess platform engines
//!
//! Four components with their own invariants, independent of transport and
//! storage:
//!
//! - [`notation`]: encode/decode between a [`models::Move`] and its compact text
//! - [`session::SessionManager`]: opaque tokens bound to usernames
//! - [`friends::FriendGraph`]: symmetric friend relationships with request/accept
//! - [`game::GameService`]: a game's ply history, clocks and lifecycle
//!
//! Storage and identity lookups go through the collaborator traits in
//! [`repositories`]; in-memory implementations are provided.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use platform::{config::PlatformConfig, repositories::*, session::SessionManager};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = PlatformConfig::from_env()?;
//! let sessions = SessionManager::new(Arc::new(MemorySessionRepository::new()), &config);
//! let token = sessions.create("alice").await?;
//! assert_eq!(sessions.lookup(&token).await?, "alice");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod friends;
pub mod game;
pub mod models;
pub mod notation;
pub mod repositories;
pub mod session;
pub mod validation;

pub use error::{PlatformError, PlatformResult};
