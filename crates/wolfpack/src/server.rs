//! `WolfpackServer` builder and accept loop.
//!
//! Ties the layers together: WebSocket transport → protocol codec →
//! session gateway → directory + game engine.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use wolfpack_directory::RoomDirectory;
use wolfpack_engine::{BroadcastFabric, GameConfig, GameRegistry};
use wolfpack_protocol::{Codec, JsonCodec};

use crate::ServerError;
use crate::auth::Identity;
use crate::gateway::{ServerState, handle_connection};

/// Builder for configuring and starting a Wolfpack server.
///
/// # Example
///
/// ```rust,no_run
/// use wolfpack::{TrustedIdentity, WolfpackServerBuilder};
///
/// # async fn run() -> Result<(), wolfpack::ServerError> {
/// let server = WolfpackServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(TrustedIdentity)
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct WolfpackServerBuilder {
    bind_addr: String,
    game_config: GameConfig,
}

impl WolfpackServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            game_config: GameConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration every new game starts with.
    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    /// Binds the listener and assembles the server with the given
    /// identity resolver. Uses `JsonCodec` — the browser client speaks
    /// JSON.
    pub async fn build<I: Identity>(
        self,
        identity: I,
    ) -> Result<WolfpackServer<I, JsonCodec>, ServerError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        info!(addr = %self.bind_addr, "listening");

        let directory = Arc::new(Mutex::new(RoomDirectory::new()));
        let fabric = Arc::new(BroadcastFabric::new());
        let registry = GameRegistry::new(Arc::clone(&directory), Arc::clone(&fabric));

        let state = Arc::new(ServerState {
            directory,
            fabric,
            registry: Mutex::new(registry),
            identity,
            codec: JsonCodec,
            game_config: self.game_config,
        });

        Ok(WolfpackServer { listener, state })
    }
}

impl Default for WolfpackServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Wolfpack server. Call [`run()`](Self::run) to start
/// accepting connections.
pub struct WolfpackServer<I: Identity, C: Codec> {
    listener: TcpListener,
    state: Arc<ServerState<I, C>>,
}

impl<I: Identity, C: Codec> WolfpackServer<I, C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Shared handle to the room directory.
    ///
    /// Room creation and joining have no WebSocket surface — they
    /// belong to whatever embeds the server (an HTTP layer, an admin
    /// tool, a test). This handle is how that layer manages rosters.
    pub fn directory(&self) -> Arc<Mutex<RoomDirectory>> {
        Arc::clone(&self.state.directory)
    }

    /// Shared handle to the broadcast fabric.
    pub fn fabric(&self) -> Arc<BroadcastFabric> {
        Arc::clone(&self.state.fabric)
    }

    /// Runs the accept loop: each connection gets its own gateway task.
    /// Runs until the process is terminated.
    pub async fn run(self) -> Result<(), ServerError> {
        info!("wolfpack server running");

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    debug!(%peer, "accepted connection");
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(err) = handle_connection(stream, state).await {
                            debug!(%peer, %err, "connection ended with error");
                        }
                    });
                }
                Err(err) => {
                    error!(%err, "accept failed");
                }
            }
        }
    }
}
