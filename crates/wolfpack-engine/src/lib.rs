//! The Wolfpack game engine.
//!
//! Everything that makes a round of the game happen lives here:
//!
//! - [`GameSession`] — the per-room round state machine: who may act,
//!   what each action does, when the game ends.
//! - [`select_wolf`] — the rotation policy picking each round's wolf.
//! - [`pack_score`] — the pure scoring function comparing two rankings.
//! - [`aggregate`] — end-of-game statistics over all rounds and players.
//! - [`GameHandle`] / [`GameRegistry`] — each started game runs as an
//!   isolated Tokio task (actor model) that serializes every mutating
//!   call for its room; the registry tracks the live actors.
//! - [`BroadcastFabric`] — pub/sub keyed by room code with a lobby and a
//!   game channel per room.
//!
//! # Concurrency discipline
//!
//! Per-room state (the session plus the directory's score records) is a
//! single logical resource. The actor owns the session outright and takes
//! the shared directory lock for the duration of each command, so two
//! mutating calls for one room can never interleave their
//! read-modify-write sequences. Rooms are independent tasks and proceed
//! in parallel. Broadcasts are published from inside the actor loop, so
//! per-room event order always matches commit order.

mod actor;
mod broadcast;
mod config;
mod error;
mod registry;
mod scoring;
mod session;
mod state;
mod stats;
mod wolf;

pub use actor::GameHandle;
pub use broadcast::BroadcastFabric;
pub use config::GameConfig;
pub use error::EngineError;
pub use registry::GameRegistry;
pub use scoring::pack_score;
pub use session::{GameSession, PackOutcome, RosterPlayer};
pub use state::{Game, Round};
pub use stats::aggregate;
pub use wolf::select_wolf;
