//! End-to-end engine tests: game actors driving the shared directory
//! and publishing through the broadcast fabric, the same wiring the
//! server uses.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::sync::broadcast::Receiver;
use tokio::time::timeout;
use wolfpack_directory::RoomDirectory;
use wolfpack_engine::{BroadcastFabric, EngineError, GameConfig, GameRegistry};
use wolfpack_protocol::{ChannelKind, Ranking, RoomCode, ServerMessage, UserId};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ranking(entries: &[(&str, u32)]) -> Ranking {
    let map: BTreeMap<String, u32> = entries
        .iter()
        .map(|(item, pos)| (item.to_string(), *pos))
        .collect();
    Ranking::try_from(map).expect("test ranking is valid")
}

/// Creates a room with the given players (first one hosts) and the
/// shared directory/fabric pair the server would hold.
fn setup(
    players: &[(u64, &str)],
) -> (Arc<Mutex<RoomDirectory>>, Arc<BroadcastFabric>, RoomCode) {
    let mut directory = RoomDirectory::new();
    let (host, host_name) = players[0];
    let code = directory
        .create_room("test room", UserId(host), host_name, 8)
        .expect("room created");
    for (id, name) in &players[1..] {
        directory
            .join_room(&code, UserId(*id), name)
            .expect("player joined");
    }
    (
        Arc::new(Mutex::new(directory)),
        Arc::new(BroadcastFabric::new()),
        code,
    )
}

async fn recv(rx: &mut Receiver<ServerMessage>) -> ServerMessage {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("broadcast within deadline")
        .expect("channel open")
}

// ---------------------------------------------------------------------------
// Full round through the actor
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_full_round_awards_pack_but_never_wolf() {
    let (directory, fabric, code) = setup(&[(1, "alice"), (2, "bob"), (3, "carol")]);
    let mut registry = GameRegistry::new(Arc::clone(&directory), Arc::clone(&fabric));
    let handle = registry
        .create_session(code.clone(), 3, GameConfig::default(), Some(21))
        .expect("session created");
    let mut game_rx = fabric.subscribe(&code, ChannelKind::Game);

    let host = UserId(1);
    handle.start_round(host, 1).await.expect("round starts");

    let ServerMessage::RoundStart { wolf_id: wolf, .. } = recv(&mut game_rx).await else {
        panic!("expected round_start first");
    };
    assert!(matches!(
        recv(&mut game_rx).await,
        ServerMessage::WolfTimer { round_number: 1, time: 120 }
    ));

    let order = ranking(&[("a", 1), ("b", 2)]);
    handle
        .wolf_order(wolf, 1, order.clone())
        .await
        .expect("wolf order accepted");
    assert!(matches!(
        recv(&mut game_rx).await,
        ServerMessage::WolfOrder { round_number: 1, .. }
    ));

    let submitter = if wolf == host { UserId(2) } else { host };
    handle
        .pack_order(submitter, 1, order)
        .await
        .expect("pack order accepted");
    let ServerMessage::RoundResult { pack_score, .. } = recv(&mut game_rx).await else {
        panic!("expected round_result");
    };
    assert_eq!(pack_score, 2);

    // Every pack member gained the score; the wolf gained nothing.
    let directory = directory.lock().await;
    for id in [1u64, 2, 3] {
        let player = directory.get_player(&code, UserId(id)).expect("player exists");
        let expected = if player.user == wolf { 0 } else { 2 };
        assert_eq!(player.score, expected, "score of {}", player.username);
    }
}

#[tokio::test]
async fn test_rejection_replies_to_caller_without_broadcasting() {
    let (directory, fabric, code) = setup(&[(1, "alice"), (2, "bob")]);
    let mut registry = GameRegistry::new(Arc::clone(&directory), Arc::clone(&fabric));
    let handle = registry
        .create_session(code.clone(), 2, GameConfig::default(), Some(3))
        .expect("session created");
    let mut game_rx = fabric.subscribe(&code, ChannelKind::Game);

    // Non-host cannot start the round; the room hears nothing about it.
    let result = handle.start_round(UserId(2), 1).await;
    assert!(matches!(result, Err(EngineError::Unauthorized(_))));
    assert!(game_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_rooms_broadcast_independently() {
    let (directory, fabric, code_a) = setup(&[(1, "alice"), (2, "bob")]);
    let code_b = directory
        .lock()
        .await
        .create_room("second room", UserId(10), "dave", 8)
        .expect("room created");
    directory
        .lock()
        .await
        .join_room(&code_b, UserId(11), "erin")
        .expect("player joined");

    let mut registry = GameRegistry::new(Arc::clone(&directory), Arc::clone(&fabric));
    let handle_a = registry
        .create_session(code_a.clone(), 2, GameConfig::default(), Some(5))
        .expect("session a");
    registry
        .create_session(code_b.clone(), 2, GameConfig::default(), Some(6))
        .expect("session b");

    let mut rx_a = fabric.subscribe(&code_a, ChannelKind::Game);
    let mut rx_b = fabric.subscribe(&code_b, ChannelKind::Game);

    handle_a.start_round(UserId(1), 1).await.expect("round starts");

    assert!(matches!(recv(&mut rx_a).await, ServerMessage::RoundStart { .. }));
    assert!(rx_b.try_recv().is_err(), "room B must not see room A's events");
}

#[tokio::test]
async fn test_game_state_snapshot_tracks_progress() {
    let (directory, fabric, code) = setup(&[(1, "alice"), (2, "bob")]);
    let mut registry = GameRegistry::new(Arc::clone(&directory), Arc::clone(&fabric));
    let handle = registry
        .create_session(code.clone(), 2, GameConfig::default(), Some(9))
        .expect("session created");

    let before = handle.game_state().await.expect("snapshot");
    assert_eq!(before.current_round, 1);

    handle.start_round(UserId(1), 1).await.expect("round starts");
    let after = handle.game_state().await.expect("snapshot");
    assert_eq!(after.wolfed_users.len(), 1);
}

// ---------------------------------------------------------------------------
// Registry lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_registry_rejects_duplicate_sessions() {
    let (directory, fabric, code) = setup(&[(1, "alice"), (2, "bob")]);
    let mut registry = GameRegistry::new(directory, fabric);
    registry
        .create_session(code.clone(), 2, GameConfig::default(), None)
        .expect("first session");
    let result = registry.create_session(code, 2, GameConfig::default(), None);
    assert!(matches!(result, Err(EngineError::SessionExists(_))));
}

#[tokio::test]
async fn test_registry_get_unknown_room_fails() {
    let (directory, fabric, _) = setup(&[(1, "alice"), (2, "bob")]);
    let registry = GameRegistry::new(directory, fabric);
    let result = registry.get(&RoomCode::from("NOSUCH"));
    assert!(matches!(result, Err(EngineError::GameNotFound(_))));
}

#[tokio::test]
async fn test_registry_destroy_stops_the_actor() {
    let (directory, fabric, code) = setup(&[(1, "alice"), (2, "bob")]);
    let mut registry = GameRegistry::new(directory, fabric);
    let handle = registry
        .create_session(code.clone(), 2, GameConfig::default(), Some(1))
        .expect("session created");

    registry.destroy(&code).await.expect("destroyed");
    assert_eq!(registry.session_count(), 0);

    // Shutdown was queued ahead of this command, so the actor is gone
    // by the time it would run.
    let result = handle.start_round(UserId(1), 1).await;
    assert!(matches!(result, Err(EngineError::Unavailable(_))));
}
