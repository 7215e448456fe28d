//! Error types for the game engine.
//!
//! Every variant maps to exactly one `error` reply to the calling
//! connection; none of them is ever broadcast, and none leaves the room
//! in an unresumable state.

use wolfpack_directory::DirectoryError;
use wolfpack_protocol::RoomCode;

/// Errors that can occur during game-session operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No game session is running for the room.
    #[error("no game is running in room {0}")]
    GameNotFound(RoomCode),

    /// A session already exists; games start once.
    #[error("a game session already exists for room {0}")]
    SessionExists(RoomCode),

    /// No round record with that number.
    #[error("round {0} not found")]
    RoundNotFound(u32),

    /// The requested round is not the game's current round.
    #[error("round {0} is not the current round")]
    WrongRound(u32),

    /// A wolf was already chosen for this round; re-rolling is not
    /// allowed.
    #[error("round {0} has already been started")]
    RoundAlreadyStarted(u32),

    /// The actor fails the role check for the requested action. The
    /// message is what the caller sees.
    #[error("{0}")]
    Unauthorized(String),

    /// A ranking was already stored for this round — submissions are
    /// idempotent-once.
    #[error("an order was already submitted for round {0}")]
    AlreadySubmitted(u32),

    /// A pack order arrived before the wolf's.
    #[error("the wolf has not submitted an order for round {0} yet")]
    WolfOrderPending(u32),

    /// The game already reached `game_ended`; statistics ran once and
    /// no further rounds start.
    #[error("the game in room {0} has already ended")]
    GameOver(RoomCode),

    /// The roster emptied out mid-game; no wolf can be chosen.
    #[error("room {0} has no players")]
    RoomEmpty(RoomCode),

    /// The session's command channel is closed or full.
    #[error("game session for room {0} is unavailable")]
    Unavailable(RoomCode),

    /// A directory lookup or score update failed underneath us.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}
