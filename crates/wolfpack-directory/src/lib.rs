//! Room and player directory for Wolfpack.
//!
//! This crate owns Room and Player identity: who is in which room, who
//! hosts it, how full it is, and everyone's score. The game engine only
//! ever *reads* rosters and *adjusts* scores through the scoring step —
//! it never creates or deletes rooms or players.
//!
//! # Concurrency note
//!
//! [`RoomDirectory`] is NOT thread-safe by itself — it's a plain struct
//! over `HashMap`. This is intentional: the server wraps it in a single
//! `Arc<tokio::sync::Mutex<_>>` and the per-room game actors take that
//! lock for the duration of each mutating command. Keeping the directory
//! itself lock-free avoids hidden double-locking.

mod directory;
mod error;
mod room;

pub use directory::{Departure, RoomDirectory};
pub use error::DirectoryError;
pub use room::{Player, Room};
