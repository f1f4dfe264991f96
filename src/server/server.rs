//! WebSocket server implementation.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::error::PollError;
use crate::protocol::{decode_client_message, ServerMessage};

use super::router;
use super::state::{ConnectionId, ServerState};

/// Shared server state wrapped in Arc<Mutex> for async access.
pub type SharedState = Arc<Mutex<ServerState>>;

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsSource = SplitStream<WebSocketStream<TcpStream>>;

/// Bind `addr` and serve until Ctrl-C.
pub async fn run(addr: SocketAddr) -> Result<(), PollError> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("WebSocket server listening on ws://{}", listener.local_addr()?);

    let state = Arc::new(Mutex::new(ServerState::new()));
    serve(listener, state, shutdown_signal()).await
}

/// Accept connections on `listener` until `shutdown` resolves.
///
/// Connections already open keep being served by their own tasks.
pub async fn serve<F>(listener: TcpListener, state: SharedState, shutdown: F) -> Result<(), PollError>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => {
                tracing::info!("Shutting down, no longer accepting connections");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer_addr)) => {
                    tokio::spawn(handle_connection(stream, peer_addr, Arc::clone(&state)));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to accept connection");
                }
            },
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, state: SharedState) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::warn!(peer = %peer_addr, error = %e, "WebSocket handshake failed");
            return;
        }
    };

    let (ws_sender, ws_receiver) = ws_stream.split();

    // Create channel for sending messages to this client
    let (tx, rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Registering queues the snapshot under the same lock, so no update can
    // slip in between the snapshot and the registration.
    let connection = state.lock().await.register(peer_addr, tx);
    tracing::info!(%connection, peer = %peer_addr, "Client connected");

    handle_messages(connection, ws_sender, ws_receiver, rx, &state).await;

    tracing::info!(%connection, peer = %peer_addr, "Client disconnected");
}

/// Pump messages for a registered connection until it closes.
async fn handle_messages(
    connection: ConnectionId,
    mut ws_sender: WsSink,
    mut ws_receiver: WsSource,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
    state: &SharedState,
) {
    // Forward queued messages to the socket; hand the sink back once the
    // channel closes so the close frame can be written after the last message.
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!(%connection, error = %e, "Failed to encode message");
                    continue;
                }
            };
            if let Err(e) = ws_sender.send(Message::Text(json.into())).await {
                tracing::debug!(%connection, error = %e, "Write failed");
                break;
            }
        }
        ws_sender
    });

    let close_frame = receive_loop(connection, &mut ws_receiver, state).await;

    // Dropping the registry entry drops the last sender and ends the writer.
    state.lock().await.unregister(connection);

    let Ok(mut ws_sender) = send_task.await else {
        return;
    };
    let closed = match close_frame {
        Some(frame) => ws_sender.send(Message::Close(Some(frame))).await,
        None => ws_sender.close().await,
    };
    if let Err(e) = closed {
        tracing::debug!(%connection, error = %e, "Close handshake failed");
    }
}

/// Process incoming frames. Returns the close frame to send if the client
/// has to be disconnected for sending garbage.
async fn receive_loop(
    connection: ConnectionId,
    ws_receiver: &mut WsSource,
    state: &SharedState,
) -> Option<CloseFrame> {
    while let Some(msg) = ws_receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(%connection, error = %e, "Read failed");
                break;
            }
        };

        let client_msg = match decode_client_message(text.as_str()) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(%connection, error = %e, "Malformed message, closing connection");
                return Some(CloseFrame {
                    code: CloseCode::Invalid,
                    reason: "malformed message".into(),
                });
            }
        };

        let mut state = state.lock().await;
        router::handle(&mut state, connection, client_msg);
    }

    None
}
