//! Core protocol types for Wolfpack's wire format.
//!
//! Every message on the wire is a flat JSON object with a `"type"` tag:
//! `{ "type": "start_round", "round_number": 2 }`. The two tagged unions
//! [`ClientMessage`] and [`ServerMessage`] are the closed sets of inbound
//! and outbound shapes; unknown inbound tags decode to
//! [`ClientMessage::Unknown`] so forward-compatible clients never crash
//! the server.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Ranking;

/// Duration of the (advisory) wolf decision timer, in seconds.
///
/// Announced to the room via [`ServerMessage::WolfTimer`] when a round
/// starts. The server does not enforce expiry.
pub const WOLF_TIMER_SECS: u64 = 120;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a user account.
///
/// Newtype over `u64` so a user id can't be confused with a round number
/// or a score. `#[serde(transparent)]` keeps the wire shape a plain
/// number: `UserId(42)` serializes as `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// A room's join code: six characters, A–Z and 0–9.
///
/// The code is the room's identity everywhere — broadcast channels,
/// directory lookups, and game sessions are all keyed by it. Immutable
/// after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// ChannelKind — which broadcast channel a connection subscribes to
// ---------------------------------------------------------------------------

/// The two logical broadcast channels every room has.
///
/// Lobby carries pre-game presence events (`player_joined`,
/// `player_count`, `game_start`); Game carries in-round events. A
/// connection subscribes to exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Lobby,
    Game,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => f.write_str("lobby"),
            Self::Game => f.write_str("game"),
        }
    }
}

// ---------------------------------------------------------------------------
// RoundStatus
// ---------------------------------------------------------------------------

/// Where a game is within the round cycle.
///
/// ```text
/// waiting_to_start → wolf_selection → pack_selection → round_completed
///        ↑                                                   │
///        └────────────── (next round) ──────────────────────┘
///                             or
///                        → game_ended (terminal)
/// ```
///
/// The round boundary auto-advances: `round_completed` is observable only
/// inside the pack-order commit; by the time the result is broadcast the
/// game is already `waiting_to_start` on the next round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    WaitingToStart,
    WolfSelection,
    PackSelection,
    RoundCompleted,
    GameEnded,
}

impl RoundStatus {
    /// Returns `true` once the game has reached its terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::GameEnded)
    }
}

impl fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::WaitingToStart => "waiting_to_start",
            Self::WolfSelection => "wolf_selection",
            Self::PackSelection => "pack_selection",
            Self::RoundCompleted => "round_completed",
            Self::GameEnded => "game_ended",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// End-of-game statistics
// ---------------------------------------------------------------------------

/// One player's line in the final statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStanding {
    pub user: UserId,
    pub username: String,
    /// Cumulative score across the whole game.
    pub total_score: u32,
    /// How many rounds this player served as the wolf.
    pub rounds_as_wolf: u32,
    /// Pack scores from the rounds where this player was in the pack.
    pub pack_scores: Vec<u32>,
}

/// Summary of a single completed round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round_number: u32,
    pub question: String,
    pub wolf: Option<UserId>,
    pub pack_score: u32,
}

/// The payload of the `game_end` broadcast, computed once when the last
/// round is complete.
///
/// `winners` holds every player tied for the maximum total score — ties
/// produce multiple winners, never an arbitrary pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    pub standings: Vec<PlayerStanding>,
    pub rounds: Vec<RoundSummary>,
    pub winners: Vec<UserId>,
}

// ---------------------------------------------------------------------------
// ClientMessage — inbound
// ---------------------------------------------------------------------------

/// Everything a client can send.
///
/// `#[serde(tag = "type")]` produces the flat `{ "type": "...", ... }`
/// envelope. The [`Unknown`](Self::Unknown) variant absorbs tags we don't
/// recognize — the gateway logs and ignores them rather than erroring, so
/// newer clients can talk to older servers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// First frame on every connection: binds it to a room and one of the
    /// two broadcast channels. Identity resolution happens here.
    Connect {
        room_code: RoomCode,
        channel: ChannelKind,
        user: UserId,
    },

    /// Host: start the game. Creates the game session and announces
    /// `game_start` on the lobby channel.
    GameStart,

    /// Lobby: announce that a player joined the room. The id is resolved
    /// to a username before rebroadcast.
    PlayerJoined { player: UserId },

    /// Host: start the given round (must be the current one).
    StartRound { round_number: u32 },

    /// Host: force the round status to an arbitrary value. Escape hatch
    /// for manual control; no transition validation.
    ChangeStatus {
        status: RoundStatus,
        round_number: u32,
    },

    /// The wolf's private ranking for the round.
    WolfOrder { order: Ranking, round_number: u32 },

    /// The pack's consensus ranking for the round.
    PackOrder { order: Ranking, round_number: u32 },

    /// Any unrecognized `"type"` tag lands here.
    #[serde(other)]
    Unknown,
}

// ---------------------------------------------------------------------------
// ServerMessage — outbound
// ---------------------------------------------------------------------------

/// Everything the server can send.
///
/// Broadcasts go to every subscriber of a room channel; `error` is only
/// ever sent to the connection whose request failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Lobby: a player joined (username, not id).
    PlayerJoined { player: String },

    /// Lobby: a player's connection went away.
    PlayerLeft { player: String },

    /// Lobby: current roster size.
    PlayerCount { count: usize },

    /// Lobby: the game is starting.
    GameStart { message: String },

    /// Game: a round began — who the wolf is and what to rank.
    RoundStart {
        round_number: u32,
        wolf_id: UserId,
        question: String,
    },

    /// Game: the wolf's decision window (advisory, seconds).
    WolfTimer { round_number: u32, time: u64 },

    /// Game: the wolf submitted their ranking. Only the fact of
    /// submission is broadcast — never the ranking itself.
    WolfOrder { round_number: u32, submitter: String },

    /// Game: round resolved. Item keys that name roster members are
    /// rendered as usernames.
    RoundResult {
        round_number: u32,
        wolf_order: BTreeMap<String, u32>,
        pack_order: BTreeMap<String, u32>,
        pack_score: u32,
    },

    /// Game: the host forced a status change.
    StatusChange {
        round_number: u32,
        status: RoundStatus,
    },

    /// Game: all rounds complete — final statistics.
    GameEnd { statistics: GameStatistics },

    /// Reply to the caller only; never broadcast.
    Error { message: String },
}

// =========================================================================
// Tests
// =========================================================================
