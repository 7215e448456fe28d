//! Game actor: an isolated Tokio task that owns one room's session.
//!
//! Each started game runs in its own task, communicating with the
//! outside world through an mpsc channel. No shared mutable game state
//! — every mutation for a room goes through its actor, so commands for
//! one room are strictly serialized while different rooms proceed in
//! parallel.
//!
//! The actor takes the shared directory lock for the duration of each
//! command: the roster snapshot it feeds the session and the score
//! updates it applies afterwards are one atomic step. Broadcasts are
//! published from inside the loop, after the commit, so subscribers see
//! events in commit order.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{info, warn};
use wolfpack_directory::RoomDirectory;
use wolfpack_protocol::{ChannelKind, Ranking, RoomCode, RoundStatus, ServerMessage, UserId};

use crate::broadcast::BroadcastFabric;
use crate::error::EngineError;
use crate::session::{GameSession, RosterPlayer};
use crate::state::Game;

/// Commands sent to a game actor through its channel.
///
/// The `oneshot::Sender` is the reply channel — the gateway sends a
/// command and awaits the result, which it turns into an `error` frame
/// on failure. Broadcasts never travel through the reply; they go out on
/// the fabric.
pub(crate) enum GameCommand {
    StartRound {
        actor: UserId,
        round_number: u32,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    WolfOrder {
        actor: UserId,
        round_number: u32,
        order: Ranking,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    PackOrder {
        actor: UserId,
        round_number: u32,
        order: Ranking,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    ChangeStatus {
        actor: UserId,
        round_number: u32,
        status: RoundStatus,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    GetGame {
        reply: oneshot::Sender<Game>,
    },
    Shutdown,
}

/// Handle to a running game actor. Cheap to clone — an `mpsc::Sender`
/// wrapper. The [`GameRegistry`](crate::GameRegistry) holds one per
/// started game.
#[derive(Clone)]
pub struct GameHandle {
    code: RoomCode,
    sender: mpsc::Sender<GameCommand>,
}

impl GameHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Host: start the given round (or end the game if none remain).
    pub async fn start_round(&self, actor: UserId, round_number: u32) -> Result<(), EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(GameCommand::StartRound {
                actor,
                round_number,
                reply: reply_tx,
            })
            .await
            .map_err(|_| EngineError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| EngineError::Unavailable(self.code.clone()))?
    }

    /// Wolf: submit the secret ranking.
    pub async fn wolf_order(
        &self,
        actor: UserId,
        round_number: u32,
        order: Ranking,
    ) -> Result<(), EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(GameCommand::WolfOrder {
                actor,
                round_number,
                order,
                reply: reply_tx,
            })
            .await
            .map_err(|_| EngineError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| EngineError::Unavailable(self.code.clone()))?
    }

    /// Pack: submit the consensus ranking and resolve the round.
    pub async fn pack_order(
        &self,
        actor: UserId,
        round_number: u32,
        order: Ranking,
    ) -> Result<(), EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(GameCommand::PackOrder {
                actor,
                round_number,
                order,
                reply: reply_tx,
            })
            .await
            .map_err(|_| EngineError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| EngineError::Unavailable(self.code.clone()))?
    }

    /// Host: force the round status.
    pub async fn change_status(
        &self,
        actor: UserId,
        round_number: u32,
        status: RoundStatus,
    ) -> Result<(), EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(GameCommand::ChangeStatus {
                actor,
                round_number,
                status,
                reply: reply_tx,
            })
            .await
            .map_err(|_| EngineError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| EngineError::Unavailable(self.code.clone()))?
    }

    /// Snapshot of the game's progress.
    pub async fn game_state(&self) -> Result<Game, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(GameCommand::GetGame { reply: reply_tx })
            .await
            .map_err(|_| EngineError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| EngineError::Unavailable(self.code.clone()))
    }

    /// Tells the actor to stop. Pending commands ahead of the shutdown
    /// still run.
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        self.sender
            .send(GameCommand::Shutdown)
            .await
            .map_err(|_| EngineError::Unavailable(self.code.clone()))
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct GameActor {
    session: GameSession,
    directory: Arc<Mutex<RoomDirectory>>,
    fabric: Arc<BroadcastFabric>,
    receiver: mpsc::Receiver<GameCommand>,
}

impl GameActor {
    async fn run(mut self) {
        info!(room = %self.session.code(), "game actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                GameCommand::StartRound {
                    actor,
                    round_number,
                    reply,
                } => {
                    let result = self.handle_start_round(actor, round_number).await;
                    let _ = reply.send(result);
                }
                GameCommand::WolfOrder {
                    actor,
                    round_number,
                    order,
                    reply,
                } => {
                    let result = self.handle_wolf_order(actor, round_number, order).await;
                    let _ = reply.send(result);
                }
                GameCommand::PackOrder {
                    actor,
                    round_number,
                    order,
                    reply,
                } => {
                    let result = self.handle_pack_order(actor, round_number, order).await;
                    let _ = reply.send(result);
                }
                GameCommand::ChangeStatus {
                    actor,
                    round_number,
                    status,
                    reply,
                } => {
                    let result = self.handle_change_status(actor, round_number, status).await;
                    let _ = reply.send(result);
                }
                GameCommand::GetGame { reply } => {
                    let _ = reply.send(self.session.game().clone());
                }
                GameCommand::Shutdown => {
                    info!(room = %self.session.code(), "game actor shutting down");
                    break;
                }
            }
        }

        info!(room = %self.session.code(), "game actor stopped");
    }

    async fn handle_start_round(
        &mut self,
        actor: UserId,
        round_number: u32,
    ) -> Result<(), EngineError> {
        let code = self.session.code().clone();
        let events = {
            let directory = self.directory.lock().await;
            let room = directory.get_room(&code)?;
            let roster = snapshot(&room.players);
            self.session
                .start_round(actor, round_number, room.host, &roster)?
        };
        self.publish(events);
        Ok(())
    }

    async fn handle_wolf_order(
        &mut self,
        actor: UserId,
        round_number: u32,
        order: Ranking,
    ) -> Result<(), EngineError> {
        let code = self.session.code().clone();
        let events = {
            let directory = self.directory.lock().await;
            let room = directory.get_room(&code)?;
            let roster = snapshot(&room.players);
            self.session
                .submit_wolf_order(actor, round_number, order, &roster)?
        };
        self.publish(events);
        Ok(())
    }

    async fn handle_pack_order(
        &mut self,
        actor: UserId,
        round_number: u32,
        order: Ranking,
    ) -> Result<(), EngineError> {
        let code = self.session.code().clone();
        let events = {
            let mut directory = self.directory.lock().await;
            let room = directory.get_room(&code)?;
            let host = room.host;
            let roster = snapshot(&room.players);
            let outcome =
                self.session
                    .submit_pack_order(actor, round_number, order, host, &roster)?;

            // The wolf never scores; everyone else in the pack does.
            if let Some(award) = outcome.award {
                for player in &roster {
                    if player.user == outcome.wolf {
                        continue;
                    }
                    if let Err(err) =
                        directory.update_player_score(&code, player.user, award)
                    {
                        warn!(room = %code, user = %player.user, %err, "score update failed");
                    }
                }
            }
            outcome.events
        };
        self.publish(events);
        Ok(())
    }

    async fn handle_change_status(
        &mut self,
        actor: UserId,
        round_number: u32,
        status: RoundStatus,
    ) -> Result<(), EngineError> {
        let code = self.session.code().clone();
        let events = {
            let directory = self.directory.lock().await;
            let room = directory.get_room(&code)?;
            self.session
                .change_status(actor, round_number, status, room.host)?
        };
        self.publish(events);
        Ok(())
    }

    fn publish(&self, events: Vec<ServerMessage>) {
        for event in events {
            self.fabric
                .publish(self.session.code(), ChannelKind::Game, event);
        }
    }
}

fn snapshot(players: &[wolfpack_directory::Player]) -> Vec<RosterPlayer> {
    players
        .iter()
        .map(|p| RosterPlayer {
            user: p.user,
            username: p.username.clone(),
            score: p.score,
        })
        .collect()
}

/// Spawns a game actor task and returns a handle to it.
///
/// `channel_size` bounds the command queue; a full queue makes callers
/// wait rather than pile up unbounded work.
pub(crate) fn spawn_game(
    session: GameSession,
    directory: Arc<Mutex<RoomDirectory>>,
    fabric: Arc<BroadcastFabric>,
    channel_size: usize,
) -> GameHandle {
    let code = session.code().clone();
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = GameActor {
        session,
        directory,
        fabric,
        receiver: rx,
    };
    tokio::spawn(actor.run());

    GameHandle { code, sender: tx }
}
