//! Wire protocol for Wolfpack.
//!
//! This crate defines the "language" that game clients and the server
//! speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`RoundStatus`],
//!   [`GameStatistics`], etc.) — the message structures that travel on
//!   the wire.
//! - **Rankings** ([`Ranking`]) — the validated item → position mapping
//!   at the heart of the game, checked at deserialization so malformed
//!   payloads never reach the state machine.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between the transport (raw frames) and the
//! gateway (player context). It doesn't know about connections, rooms,
//! or game rules — it only knows how to represent and (de)serialize
//! messages.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Gateway (room context)
//! ```

mod codec;
mod error;
mod ranking;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use ranking::{Ranking, RankingError};
pub use types::{
    ChannelKind, ClientMessage, GameStatistics, PlayerStanding, RoomCode,
    RoundStatus, RoundSummary, ServerMessage, UserId, WOLF_TIMER_SECS,
};
