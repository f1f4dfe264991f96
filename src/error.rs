use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Error type for server and client operations.
#[derive(Debug, Error)]
pub enum PollError {
    /// Socket or terminal I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// WebSocket handshake or transport failed.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// A message could not be encoded or decoded.
    #[error("Invalid message: {0}")]
    Json(#[from] serde_json::Error),

    /// The peer closed the connection before we were done.
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// Gave up waiting for the server.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}
