//! Room and player records.

use wolfpack_protocol::{RoomCode, UserId};

/// A member of a room.
///
/// `score` is cumulative for the current game and only ever grows — the
/// engine awards points through
/// [`RoomDirectory::update_player_score`](crate::RoomDirectory::update_player_score),
/// nothing else touches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub user: UserId,
    pub username: String,
    pub score: u32,
}

/// One game room.
///
/// `players` is kept in join order; that order is load-bearing — it is
/// the documented tie-break when the engine picks the lowest-scoring
/// pack submitter, and the host succession order when the host leaves.
#[derive(Debug, Clone)]
pub struct Room {
    pub name: String,
    pub code: RoomCode,
    pub host: UserId,
    pub players: Vec<Player>,
    pub max_players: usize,
    pub game_started: bool,
}

impl Room {
    /// Looks up a roster member by user id.
    pub fn player(&self, user: UserId) -> Option<&Player> {
        self.players.iter().find(|p| p.user == user)
    }

    /// Returns `true` if the user is on the roster.
    pub fn contains(&self, user: UserId) -> bool {
        self.player(user).is_some()
    }

    /// Current roster size.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}
