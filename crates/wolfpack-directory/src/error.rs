//! Error types for the directory layer.

use wolfpack_protocol::{RoomCode, UserId};

/// Errors that can occur during room/player directory operations.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// No room exists with the given code.
    #[error("room {0} not found")]
    RoomNotFound(RoomCode),

    /// The user is not a member of the room.
    #[error("user {0} is not in room {1}")]
    PlayerNotFound(UserId, RoomCode),

    /// The room has reached its capacity bound.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The user is already a member of the room.
    #[error("user {0} is already in room {1}")]
    AlreadyInRoom(UserId, RoomCode),

    /// The game for this room has already been started.
    #[error("game in room {0} has already started")]
    GameAlreadyStarted(RoomCode),

    /// A game needs at least two players.
    #[error("room {0} has {1} players, at least 2 required")]
    NotEnoughPlayers(RoomCode, usize),

    /// `max_players` below the minimum viable roster.
    #[error("max_players must be at least 2, got {0}")]
    InvalidCapacity(usize),
}
