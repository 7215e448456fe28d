//! Room-scoped pub/sub.
//!
//! Every room has two broadcast channels — lobby and game — and a
//! connection subscribes to exactly one. Channels are created lazily on
//! first subscribe or publish, so the fabric never needs to know about
//! room lifecycle up front.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;
use tracing::trace;
use wolfpack_protocol::{ChannelKind, RoomCode, ServerMessage};

/// Buffered messages per channel before slow subscribers start lagging.
const CHANNEL_CAPACITY: usize = 64;

/// Fan-out of [`ServerMessage`]s keyed by `(room, channel)`.
///
/// Internally a `std::sync::Mutex` — every operation is a quick map
/// lookup with no `.await` inside, so an async lock would buy nothing.
/// Messages published to a channel with no subscribers are dropped,
/// which is the correct behavior for an empty room.
#[derive(Default)]
pub struct BroadcastFabric {
    channels: Mutex<HashMap<(RoomCode, ChannelKind), broadcast::Sender<ServerMessage>>>,
}

impl BroadcastFabric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one of a room's channels, creating it if needed.
    pub fn subscribe(&self, code: &RoomCode, kind: ChannelKind) -> broadcast::Receiver<ServerMessage> {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        channels
            .entry((code.clone(), kind))
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publish to a room channel. Returns how many subscribers received
    /// the message; zero means nobody was listening.
    pub fn publish(&self, code: &RoomCode, kind: ChannelKind, message: ServerMessage) -> usize {
        let channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        match channels.get(&(code.clone(), kind)) {
            Some(sender) => {
                let delivered = sender.send(message).unwrap_or(0);
                trace!(room = %code, channel = %kind, delivered, "broadcast");
                delivered
            }
            None => 0,
        }
    }

    /// Tear down both of a room's channels. Existing receivers see the
    /// stream close.
    pub fn drop_room(&self, code: &RoomCode) {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        channels.remove(&(code.clone(), ChannelKind::Lobby));
        channels.remove(&(code.clone(), ChannelKind::Game));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> RoomCode {
        RoomCode::from(s)
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let fabric = BroadcastFabric::new();
        let mut rx = fabric.subscribe(&code("ROOM01"), ChannelKind::Game);

        let delivered = fabric.publish(
            &code("ROOM01"),
            ChannelKind::Game,
            ServerMessage::PlayerCount { count: 3 },
        );
        assert_eq!(delivered, 1);
        assert_eq!(rx.recv().await.unwrap(), ServerMessage::PlayerCount { count: 3 });
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_dropped() {
        let fabric = BroadcastFabric::new();
        let delivered = fabric.publish(
            &code("EMPTY0"),
            ChannelKind::Lobby,
            ServerMessage::PlayerCount { count: 0 },
        );
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_channels_are_isolated_by_room_and_kind() {
        let fabric = BroadcastFabric::new();
        let mut lobby = fabric.subscribe(&code("ROOM01"), ChannelKind::Lobby);
        let mut other = fabric.subscribe(&code("ROOM02"), ChannelKind::Game);

        fabric.publish(
            &code("ROOM01"),
            ChannelKind::Game,
            ServerMessage::PlayerCount { count: 1 },
        );

        assert!(lobby.try_recv().is_err());
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_drop_room_closes_receivers() {
        let fabric = BroadcastFabric::new();
        let mut rx = fabric.subscribe(&code("ROOM01"), ChannelKind::Game);
        fabric.drop_room(&code("ROOM01"));
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_subscribers_receive_in_publish_order() {
        let fabric = BroadcastFabric::new();
        let mut rx = fabric.subscribe(&code("ROOM01"), ChannelKind::Game);
        for count in 1..=3 {
            fabric.publish(
                &code("ROOM01"),
                ChannelKind::Game,
                ServerMessage::PlayerCount { count },
            );
        }
        for count in 1..=3 {
            assert_eq!(rx.recv().await.unwrap(), ServerMessage::PlayerCount { count });
        }
    }
}
