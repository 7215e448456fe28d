//! Unified error type for the server.

use wolfpack_directory::DirectoryError;
use wolfpack_engine::EngineError;
use wolfpack_protocol::ProtocolError;

/// Top-level error wrapping every layer's error type.
///
/// The gateway turns most of these into an `error` frame for the calling
/// connection; the `#[from]` impls let `?` do the conversion.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Encode/decode failure at the wire boundary.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Room or roster lookup failure.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Game rule or session failure.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// TCP-level failure (bind, accept).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket-level failure (handshake, send, recv).
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The connection broke the gateway contract (bad first frame,
    /// wrong channel for the request).
    #[error("{0}")]
    Gateway(String),
}
