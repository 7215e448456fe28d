//! The room directory: creates rooms, tracks rosters, holds scores.

use std::collections::HashMap;

use rand::Rng;
use wolfpack_protocol::{RoomCode, UserId};

use crate::{DirectoryError, Player, Room};

/// Characters used in room codes, matching what players can type from a
/// shared screen: uppercase letters and digits.
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a room code.
const CODE_LEN: usize = 6;

/// What happened to a room when a player left it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    /// The player left; room unchanged otherwise.
    Left,
    /// The departing player was the host; the earliest remaining joiner
    /// took over.
    HostTransferred(UserId),
    /// The last player left and the room was deleted.
    RoomClosed,
}

/// Registry of all active rooms, keyed by room code.
///
/// This is the authoritative source for room membership, hosting, and
/// scores. The engine consumes it; the HTTP-facing room endpoints (out
/// of scope here) would drive `create_room`/`join_room`/`leave_room`.
pub struct RoomDirectory {
    rooms: HashMap<RoomCode, Room>,
}

impl RoomDirectory {
    /// Creates a new, empty directory.
    pub fn new() -> Self {
        Self { rooms: HashMap::new() }
    }

    /// Creates a room with a freshly generated unique code. The creator
    /// becomes host and the first roster member.
    ///
    /// # Errors
    /// Returns [`DirectoryError::InvalidCapacity`] if `max_players < 2`.
    pub fn create_room(
        &mut self,
        name: &str,
        host: UserId,
        host_username: &str,
        max_players: usize,
    ) -> Result<RoomCode, DirectoryError> {
        if max_players < 2 {
            return Err(DirectoryError::InvalidCapacity(max_players));
        }

        let code = self.generate_unique_code();
        let room = Room {
            name: name.to_string(),
            code: code.clone(),
            host,
            players: vec![Player {
                user: host,
                username: host_username.to_string(),
                score: 0,
            }],
            max_players,
            game_started: false,
        };
        self.rooms.insert(code.clone(), room);

        tracing::info!(room = %code, %host, "room created");
        Ok(code)
    }

    /// Adds a user to a room's roster.
    ///
    /// # Errors
    /// - [`DirectoryError::RoomNotFound`] — no such room
    /// - [`DirectoryError::RoomFull`] — capacity reached
    /// - [`DirectoryError::AlreadyInRoom`] — duplicate join
    pub fn join_room(
        &mut self,
        code: &RoomCode,
        user: UserId,
        username: &str,
    ) -> Result<(), DirectoryError> {
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| DirectoryError::RoomNotFound(code.clone()))?;

        if room.contains(user) {
            return Err(DirectoryError::AlreadyInRoom(user, code.clone()));
        }
        if room.player_count() >= room.max_players {
            return Err(DirectoryError::RoomFull(code.clone()));
        }

        room.players.push(Player {
            user,
            username: username.to_string(),
            score: 0,
        });

        tracing::info!(
            room = %code,
            %user,
            players = room.player_count(),
            "player joined room"
        );
        Ok(())
    }

    /// Removes a user from a room's roster.
    ///
    /// If the host leaves, the earliest remaining joiner becomes host.
    /// If nobody remains, the room is deleted.
    pub fn leave_room(
        &mut self,
        code: &RoomCode,
        user: UserId,
    ) -> Result<Departure, DirectoryError> {
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| DirectoryError::RoomNotFound(code.clone()))?;

        let idx = room
            .players
            .iter()
            .position(|p| p.user == user)
            .ok_or_else(|| DirectoryError::PlayerNotFound(user, code.clone()))?;
        room.players.remove(idx);

        if room.players.is_empty() {
            self.rooms.remove(code);
            tracing::info!(room = %code, "room closed, no players left");
            return Ok(Departure::RoomClosed);
        }

        if room.host == user {
            let new_host = room.players[0].user;
            room.host = new_host;
            tracing::info!(room = %code, %new_host, "host left, host transferred");
            return Ok(Departure::HostTransferred(new_host));
        }

        tracing::info!(room = %code, %user, "player left room");
        Ok(Departure::Left)
    }

    /// Looks up a room by code.
    pub fn get_room(&self, code: &RoomCode) -> Result<&Room, DirectoryError> {
        self.rooms
            .get(code)
            .ok_or_else(|| DirectoryError::RoomNotFound(code.clone()))
    }

    /// Looks up a single roster member.
    pub fn get_player(
        &self,
        code: &RoomCode,
        user: UserId,
    ) -> Result<&Player, DirectoryError> {
        self.get_room(code)?
            .player(user)
            .ok_or_else(|| DirectoryError::PlayerNotFound(user, code.clone()))
    }

    /// Adds `delta` to a player's score and returns the new total.
    ///
    /// Scores only ever increase within a game; the engine calls this
    /// once per scoring round for each pack member.
    pub fn update_player_score(
        &mut self,
        code: &RoomCode,
        user: UserId,
        delta: u32,
    ) -> Result<u32, DirectoryError> {
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| DirectoryError::RoomNotFound(code.clone()))?;
        let player = room
            .players
            .iter_mut()
            .find(|p| p.user == user)
            .ok_or_else(|| DirectoryError::PlayerNotFound(user, code.clone()))?;

        player.score += delta;
        tracing::debug!(room = %code, %user, score = player.score, "score updated");
        Ok(player.score)
    }

    /// Flags the room's game as started and returns the roster size
    /// (which fixes the number of rounds).
    ///
    /// # Errors
    /// - [`DirectoryError::GameAlreadyStarted`] — double start
    /// - [`DirectoryError::NotEnoughPlayers`] — fewer than 2 players
    pub fn mark_game_started(
        &mut self,
        code: &RoomCode,
    ) -> Result<usize, DirectoryError> {
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| DirectoryError::RoomNotFound(code.clone()))?;

        if room.game_started {
            return Err(DirectoryError::GameAlreadyStarted(code.clone()));
        }
        let count = room.player_count();
        if count < 2 {
            return Err(DirectoryError::NotEnoughPlayers(code.clone(), count));
        }

        room.game_started = true;
        tracing::info!(room = %code, players = count, "game started");
        Ok(count)
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if no rooms exist.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Generates a code that isn't already in use. Collisions are
    /// astronomically unlikely (36^6 codes) but the loop makes
    /// uniqueness unconditional.
    fn generate_unique_code(&self) -> RoomCode {
        let mut rng = rand::rng();
        loop {
            let code: String = (0..CODE_LEN)
                .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
                .collect();
            let code = RoomCode(code);
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }
}

impl Default for RoomDirectory {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
