//! Game registry: creates, tracks, and tears down game actors.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use wolfpack_directory::RoomDirectory;
use wolfpack_protocol::RoomCode;

use crate::actor::{GameHandle, spawn_game};
use crate::broadcast::BroadcastFabric;
use crate::config::GameConfig;
use crate::error::EngineError;
use crate::session::GameSession;

/// Default command channel size for game actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Tracks the live game actor for every room whose game has started.
///
/// One registry per server, wrapped in a `Mutex` by the gateway the same
/// way the directory is. Holds shared handles to the directory and the
/// broadcast fabric so actor spawning needs nothing else.
pub struct GameRegistry {
    directory: Arc<Mutex<RoomDirectory>>,
    fabric: Arc<BroadcastFabric>,
    sessions: HashMap<RoomCode, GameHandle>,
}

impl GameRegistry {
    pub fn new(directory: Arc<Mutex<RoomDirectory>>, fabric: Arc<BroadcastFabric>) -> Self {
        Self {
            directory,
            fabric,
            sessions: HashMap::new(),
        }
    }

    /// Spawns a game actor for a room. `round_count` is the roster size
    /// at game start; a `seed` pins the session's randomness for tests.
    ///
    /// # Errors
    /// Returns [`EngineError::SessionExists`] if the room already has a
    /// running game.
    pub fn create_session(
        &mut self,
        code: RoomCode,
        round_count: u32,
        config: GameConfig,
        seed: Option<u64>,
    ) -> Result<GameHandle, EngineError> {
        if self.sessions.contains_key(&code) {
            return Err(EngineError::SessionExists(code));
        }

        let session = GameSession::new(code.clone(), round_count, config, seed);
        let handle = spawn_game(
            session,
            Arc::clone(&self.directory),
            Arc::clone(&self.fabric),
            DEFAULT_CHANNEL_SIZE,
        );
        self.sessions.insert(code.clone(), handle.clone());
        info!(room = %code, rounds = round_count, "game session created");
        Ok(handle)
    }

    /// Returns a cloned handle to a room's game.
    pub fn get(&self, code: &RoomCode) -> Result<GameHandle, EngineError> {
        self.sessions
            .get(code)
            .cloned()
            .ok_or_else(|| EngineError::GameNotFound(code.clone()))
    }

    /// Shuts down a room's game actor and forgets it.
    pub async fn destroy(&mut self, code: &RoomCode) -> Result<(), EngineError> {
        let handle = self
            .sessions
            .remove(code)
            .ok_or_else(|| EngineError::GameNotFound(code.clone()))?;
        let _ = handle.shutdown().await;
        info!(room = %code, "game session destroyed");
        Ok(())
    }

    /// Number of running games.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
