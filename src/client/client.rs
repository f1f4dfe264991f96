//! Terminal client for a poll server.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;

use crate::error::PollError;
use crate::protocol::{decode_server_message, ClientMessage};
use crate::terminal::TerminalSession;

use super::state::{ClientApp, ConnectionStatus, InputMode};
use super::ui;

/// Shared client app state.
type SharedApp = Arc<Mutex<ClientApp>>;

/// How long to wait for the close handshake after the user quits.
const CLOSE_GRACE: Duration = Duration::from_millis(500);

/// Run the terminal client against `ws://host:port`.
///
/// The screen opens immediately; connecting happens in the background and a
/// failed connect is shown on screen rather than returned.
pub async fn run(host: String, port: u16) -> Result<(), PollError> {
    let app = Arc::new(Mutex::new(ClientApp::new(host, port)));

    // Create channel for outgoing messages
    let (tx, rx) = mpsc::unbounded_channel::<ClientMessage>();

    let mut connection = tokio::spawn(connect_and_pump(Arc::clone(&app), rx));

    // Dropping `tx` with the TUI lets the writer close the socket
    let result = run_tui(app, tx).await;

    if tokio::time::timeout(CLOSE_GRACE, &mut connection).await.is_err() {
        connection.abort();
    }

    result
}

/// Connect, then forward outgoing messages and apply incoming ones until the
/// connection ends.
async fn connect_and_pump(app: SharedApp, mut rx: mpsc::UnboundedReceiver<ClientMessage>) {
    let url = app.lock().await.server_url();

    let ws_stream = match tokio_tungstenite::connect_async(&url).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            app.lock().await.disconnect(format!("Could not reach {}: {}", url, e));
            return;
        }
    };
    app.lock().await.mark_connected();

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Ok(json) = serde_json::to_string(&msg) else {
                continue;
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    while let Some(msg) = ws_receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => {
                app.lock()
                    .await
                    .disconnect("Connection closed by server".to_string());
                return;
            }
            Err(e) => {
                app.lock().await.disconnect(format!("Connection error: {}", e));
                return;
            }
            _ => continue,
        };

        // Ignore anything we do not understand rather than dropping the session
        if let Ok(server_msg) = decode_server_message(text.as_str()) {
            app.lock().await.apply(server_msg);
        }
    }

    app.lock().await.disconnect("Connection closed".to_string());
}

/// Run the client TUI.
async fn run_tui(app: SharedApp, tx: mpsc::UnboundedSender<ClientMessage>) -> Result<(), PollError> {
    let mut terminal = TerminalSession::enter()?;

    loop {
        {
            let app = app.lock().await;
            if app.should_quit {
                break;
            }
            terminal.draw(|frame| ui::render(frame, &app))?;
        }

        // Poll with a timeout so server updates get redrawn
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if handle_input(&app, &tx, key.code).await {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Handle keyboard input. Returns true if the client should exit.
async fn handle_input(
    app: &SharedApp,
    tx: &mpsc::UnboundedSender<ClientMessage>,
    key: KeyCode,
) -> bool {
    let mut app = app.lock().await;

    if !matches!(app.status, ConnectionStatus::Connected) {
        if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc | KeyCode::Enter) {
            app.should_quit = true;
            return true;
        }
        return false;
    }

    if let InputMode::Composing { .. } = app.mode {
        match key {
            KeyCode::Char(c) => app.compose_push(c),
            KeyCode::Backspace => app.compose_pop(),
            KeyCode::Enter => {
                if let Some(msg) = app.submit_composing() {
                    let _ = tx.send(msg);
                }
            }
            KeyCode::Esc => app.cancel_composing(),
            _ => {}
        }
        return false;
    }

    match key {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('+') | KeyCode::Char('=') => {
            if let Some(msg) = app.vote_selected(1) {
                let _ = tx.send(msg);
            }
        }
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('-') => {
            if let Some(msg) = app.vote_selected(-1) {
                let _ = tx.send(msg);
            }
        }
        KeyCode::Char('a') | KeyCode::Char('A') => app.start_composing(),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
            app.should_quit = true;
            return true;
        }
        _ => {}
    }

    false
}
