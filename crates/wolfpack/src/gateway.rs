//! Per-connection gateway: connect binding, message routing, cleanup.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The flow is:
//!   1. Receive `connect { room_code, channel, user }` → bind the
//!      connection to a room and one broadcast channel
//!   2. Spawn a writer task (owns the sink) and a forwarder task
//!      (broadcast channel → writer), so broadcasts and direct replies
//!      never contend for the socket
//!   3. Loop: decode inbound messages → dispatch lobby or game commands
//!   4. On disconnect: lobby connections leave the roster and the room
//!      hears `player_left` + `player_count`

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use wolfpack_directory::{Departure, RoomDirectory};
use wolfpack_engine::{BroadcastFabric, GameConfig, GameRegistry};
use wolfpack_protocol::{
    ChannelKind, ClientMessage, Codec, ProtocolError, RoomCode, ServerMessage, UserId,
};

use crate::ServerError;
use crate::auth::Identity;

/// Counter for tagging connections in logs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// How long a fresh connection gets to send its `connect` frame.
const CONNECT_DEADLINE: Duration = Duration::from_secs(10);

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<I: Identity, C: Codec> {
    pub(crate) directory: Arc<Mutex<RoomDirectory>>,
    pub(crate) fabric: Arc<BroadcastFabric>,
    pub(crate) registry: Mutex<GameRegistry>,
    pub(crate) identity: I,
    pub(crate) codec: C,
    pub(crate) game_config: GameConfig,
}

/// What the `connect` frame bound this connection to.
struct Binding {
    code: RoomCode,
    channel: ChannelKind,
    user: UserId,
    username: String,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<I, C>(
    stream: TcpStream,
    state: Arc<ServerState<I, C>>,
) -> Result<(), ServerError>
where
    I: Identity,
    C: Codec,
{
    let conn_id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut sink, mut reader) = ws.split();

    // The writer task owns the sink. Direct replies and forwarded
    // broadcasts both go through this channel, so frame writes never
    // interleave.
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
    let writer = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            if sink.send(msg).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let result = serve(conn_id, &mut reader, &out_tx, &state).await;

    drop(out_tx);
    let _ = writer.await;
    result
}

async fn serve<I, C, S>(
    conn_id: u64,
    reader: &mut S,
    out_tx: &mpsc::UnboundedSender<Message>,
    state: &Arc<ServerState<I, C>>,
) -> Result<(), ServerError>
where
    I: Identity,
    C: Codec,
    S: StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let binding = match establish_binding(conn_id, reader, state).await {
        Ok(binding) => binding,
        Err(err) => {
            send_error(out_tx, &state.codec, &err.to_string());
            return Err(err);
        }
    };
    info!(
        conn_id,
        room = %binding.code,
        channel = %binding.channel,
        user = %binding.user,
        "connection bound"
    );

    // Forward this room channel's broadcasts out the socket until the
    // connection ends.
    let mut broadcast_rx = state.fabric.subscribe(&binding.code, binding.channel);
    let forwarder = {
        let out_tx = out_tx.clone();
        let state = Arc::clone(state);
        tokio::spawn(async move {
            loop {
                match broadcast_rx.recv().await {
                    Ok(event) => match state.codec.encode(&event) {
                        Ok(bytes) => {
                            if out_tx.send(Message::Binary(bytes.into())).is_err() {
                                break;
                            }
                        }
                        Err(err) => warn!(%err, "failed to encode broadcast"),
                    },
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "slow consumer lagged behind broadcasts");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    };

    // Main read loop.
    while let Some(frame) = reader.next().await {
        let data = match frame {
            Ok(Message::Binary(data)) => data.to_vec(),
            Ok(Message::Text(text)) => text.as_bytes().to_vec(),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue, // ping/pong
            Err(err) => {
                debug!(conn_id, %err, "recv error");
                break;
            }
        };

        let message: ClientMessage = match state.codec.decode(&data) {
            Ok(message) => message,
            Err(err) => {
                debug!(conn_id, %err, "malformed frame");
                send_error(out_tx, &state.codec, &format!("malformed message: {err}"));
                continue;
            }
        };

        if let Err(err) = dispatch(&binding, message, state).await {
            send_error(out_tx, &state.codec, &err.to_string());
        }
    }

    forwarder.abort();
    disconnect(&binding, state).await;
    Ok(())
}

/// Reads and validates the mandatory first frame.
async fn establish_binding<I, C, S>(
    conn_id: u64,
    reader: &mut S,
    state: &Arc<ServerState<I, C>>,
) -> Result<Binding, ServerError>
where
    I: Identity,
    C: Codec,
    S: StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let frame = tokio::time::timeout(CONNECT_DEADLINE, reader.next())
        .await
        .map_err(|_| ServerError::Gateway("connect frame timed out".to_string()))?;

    let data = match frame {
        Some(Ok(Message::Binary(data))) => data.to_vec(),
        Some(Ok(Message::Text(text))) => text.as_bytes().to_vec(),
        Some(Err(err)) => return Err(err.into()),
        _ => {
            return Err(ServerError::Gateway(
                "connection closed before connect frame".to_string(),
            ));
        }
    };

    let message: ClientMessage = state.codec.decode(&data)?;
    let ClientMessage::Connect {
        room_code,
        channel,
        user,
    } = message
    else {
        return Err(ServerError::Protocol(ProtocolError::InvalidMessage(
            "first message must be connect".to_string(),
        )));
    };

    let directory = state.directory.lock().await;
    let room = directory.get_room(&room_code)?;
    let roster_name = room.player(user).map(|p| p.username.clone());
    if channel == ChannelKind::Game && roster_name.is_none() {
        return Err(ServerError::Gateway(format!(
            "user {user} is not a member of room {room_code}"
        )));
    }
    drop(directory);

    let username = match roster_name {
        Some(name) => name,
        None => state
            .identity
            .resolve(user)
            .await
            .map_err(|err| ServerError::Gateway(err.to_string()))?,
    };

    debug!(conn_id, room = %room_code, %user, "connect frame accepted");
    Ok(Binding {
        code: room_code,
        channel,
        user,
        username,
    })
}

/// Routes one inbound message. Errors become an `error` frame to this
/// connection only — broadcasts never carry failures.
async fn dispatch<I, C>(
    binding: &Binding,
    message: ClientMessage,
    state: &Arc<ServerState<I, C>>,
) -> Result<(), ServerError>
where
    I: Identity,
    C: Codec,
{
    match (binding.channel, message) {
        // -------------------------------------------------------------
        // Lobby commands
        // -------------------------------------------------------------
        (ChannelKind::Lobby, ClientMessage::GameStart) => {
            handle_game_start(binding, state).await
        }
        (ChannelKind::Lobby, ClientMessage::PlayerJoined { player }) => {
            handle_player_joined(binding, player, state).await
        }

        // -------------------------------------------------------------
        // Game commands — forwarded to the room's actor
        // -------------------------------------------------------------
        (ChannelKind::Game, ClientMessage::StartRound { round_number }) => {
            let handle = state.registry.lock().await.get(&binding.code)?;
            handle.start_round(binding.user, round_number).await?;
            Ok(())
        }
        (ChannelKind::Game, ClientMessage::WolfOrder { order, round_number }) => {
            let handle = state.registry.lock().await.get(&binding.code)?;
            handle.wolf_order(binding.user, round_number, order).await?;
            Ok(())
        }
        (ChannelKind::Game, ClientMessage::PackOrder { order, round_number }) => {
            let handle = state.registry.lock().await.get(&binding.code)?;
            handle.pack_order(binding.user, round_number, order).await?;
            Ok(())
        }
        (ChannelKind::Game, ClientMessage::ChangeStatus { status, round_number }) => {
            let handle = state.registry.lock().await.get(&binding.code)?;
            handle
                .change_status(binding.user, round_number, status)
                .await?;
            Ok(())
        }

        // Unknown tags are logged and ignored, never answered.
        (_, ClientMessage::Unknown) => {
            debug!(room = %binding.code, user = %binding.user, "ignoring unknown message type");
            Ok(())
        }
        (_, ClientMessage::Connect { .. }) => Err(ServerError::Gateway(
            "connection is already bound".to_string(),
        )),

        // A recognized command on the wrong channel.
        (channel, _) => Err(ServerError::Gateway(format!(
            "message not available on the {channel} channel"
        ))),
    }
}

/// Host starts the game: flag the room, spawn the game actor with one
/// round per player, announce on the lobby channel.
async fn handle_game_start<I, C>(
    binding: &Binding,
    state: &Arc<ServerState<I, C>>,
) -> Result<(), ServerError>
where
    I: Identity,
    C: Codec,
{
    let round_count = {
        let mut directory = state.directory.lock().await;
        let room = directory.get_room(&binding.code)?;
        if room.host != binding.user {
            return Err(ServerError::Gateway(
                "Only the host can start the game".to_string(),
            ));
        }
        directory.mark_game_started(&binding.code)?
    };

    state.registry.lock().await.create_session(
        binding.code.clone(),
        round_count as u32,
        state.game_config.clone(),
        None,
    )?;

    state.fabric.publish(
        &binding.code,
        ChannelKind::Lobby,
        ServerMessage::GameStart {
            message: "The game is starting!".to_string(),
        },
    );
    Ok(())
}

/// A player announces themselves to the lobby: join the roster if they
/// are not on it yet, then tell the room who arrived and how many are in.
async fn handle_player_joined<I, C>(
    binding: &Binding,
    player: UserId,
    state: &Arc<ServerState<I, C>>,
) -> Result<(), ServerError>
where
    I: Identity,
    C: Codec,
{
    let mut directory = state.directory.lock().await;
    let (username, count) = match directory.get_player(&binding.code, player) {
        Ok(existing) => (
            existing.username.clone(),
            directory.get_room(&binding.code)?.player_count(),
        ),
        Err(_) => {
            let username = state
                .identity
                .resolve(player)
                .await
                .map_err(|err| ServerError::Gateway(err.to_string()))?;
            directory.join_room(&binding.code, player, &username)?;
            (username, directory.get_room(&binding.code)?.player_count())
        }
    };
    drop(directory);

    state.fabric.publish(
        &binding.code,
        ChannelKind::Lobby,
        ServerMessage::PlayerJoined { player: username },
    );
    state.fabric.publish(
        &binding.code,
        ChannelKind::Lobby,
        ServerMessage::PlayerCount { count },
    );
    Ok(())
}

/// Lobby connections represent presence: when one ends, the player
/// leaves the roster and the room hears about it. Game connections are
/// passive subscriptions; dropping one changes nothing.
async fn disconnect<I, C>(binding: &Binding, state: &Arc<ServerState<I, C>>)
where
    I: Identity,
    C: Codec,
{
    if binding.channel != ChannelKind::Lobby {
        return;
    }

    let mut directory = state.directory.lock().await;
    let departure = match directory.leave_room(&binding.code, binding.user) {
        Ok(departure) => departure,
        Err(err) => {
            debug!(room = %binding.code, user = %binding.user, %err, "leave on disconnect");
            return;
        }
    };
    let remaining = directory
        .get_room(&binding.code)
        .map(|room| room.player_count())
        .unwrap_or(0);
    drop(directory);

    match departure {
        Departure::RoomClosed => {
            // Last player gone: tear down the game (if any) and the
            // room's channels.
            let mut registry = state.registry.lock().await;
            if let Err(err) = registry.destroy(&binding.code).await {
                debug!(room = %binding.code, %err, "no game to destroy");
            }
            state.fabric.drop_room(&binding.code);
            info!(room = %binding.code, "room torn down after last disconnect");
        }
        departure => {
            if let Departure::HostTransferred(new_host) = departure {
                info!(room = %binding.code, %new_host, "host transferred on disconnect");
            }
            state.fabric.publish(
                &binding.code,
                ChannelKind::Lobby,
                ServerMessage::PlayerLeft {
                    player: binding.username.clone(),
                },
            );
            state.fabric.publish(
                &binding.code,
                ChannelKind::Lobby,
                ServerMessage::PlayerCount { count: remaining },
            );
        }
    }
}

/// Sends an `error` frame to this connection. Failures mean the writer
/// is gone, which the read loop will notice on its own.
fn send_error<C: Codec>(out_tx: &mpsc::UnboundedSender<Message>, codec: &C, message: &str) {
    let frame = ServerMessage::Error {
        message: message.to_string(),
    };
    match codec.encode(&frame) {
        Ok(bytes) => {
            let _ = out_tx.send(Message::Binary(bytes.into()));
        }
        Err(err) => warn!(%err, "failed to encode error frame"),
    }
}
