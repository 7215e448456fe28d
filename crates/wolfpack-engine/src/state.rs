//! Persistent round and game records.
//!
//! These are plain data — the rules that mutate them live in
//! [`crate::session::GameSession`]. Snapshots of these structs are what
//! the actor hands out for read queries, so they stay `Clone`.

use wolfpack_protocol::{Ranking, RoundStatus, UserId};

/// Top-level progress of one game: which round is current, what phase it
/// is in, and who has already been the wolf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    /// The round that is currently playing (or about to play). Starts
    /// at 1 and advances when a round completes.
    pub current_round: u32,
    /// Phase of the current round.
    pub round_status: RoundStatus,
    /// Players who have already served as wolf this rotation, in
    /// selection order. Cleared when everyone has had a turn.
    pub wolfed_users: Vec<UserId>,
}

impl Game {
    pub fn new() -> Self {
        Self {
            current_round: 1,
            round_status: RoundStatus::WaitingToStart,
            wolfed_users: Vec::new(),
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// One round's record: its wolf, its prompt, and both submitted
/// rankings once they arrive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub round_number: u32,
    /// `None` until the round is started and a wolf is drawn.
    pub wolf: Option<UserId>,
    pub question: String,
    pub wolf_ranking: Option<Ranking>,
    pub pack_ranking: Option<Ranking>,
    /// Exact-position matches awarded to the pack. Zero until scored.
    pub pack_score: u32,
}

impl Round {
    pub fn new(round_number: u32) -> Self {
        Self {
            round_number,
            wolf: None,
            question: String::new(),
            wolf_ranking: None,
            pack_ranking: None,
            pack_score: 0,
        }
    }

    /// True once both rankings are in and the round has been scored.
    pub fn is_complete(&self) -> bool {
        self.wolf_ranking.is_some() && self.pack_ranking.is_some()
    }
}
