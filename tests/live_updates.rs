use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use live_poll::client::probe;
use live_poll::protocol::{decode_server_message, ServerMessage};
use live_poll::PollError;
use live_poll::server::{serve, ServerState, SharedState};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> (String, SharedState) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(Mutex::new(ServerState::new()));
    tokio::spawn(serve(listener, Arc::clone(&state), std::future::pending::<()>()));
    (format!("ws://{}", addr), state)
}

async fn wait_for_connections(state: &SharedState, expected: usize) {
    for _ in 0..200 {
        if state.lock().await.connection_count() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("server never reached {} connections", expected);
}

/// Connect and wait until the server has registered the connection.
async fn connect(url: &str, state: &SharedState) -> Ws {
    let before = state.lock().await.connection_count();
    let (ws, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    wait_for_connections(state, before + 1).await;
    ws
}

async fn send(ws: &mut Ws, value: Value) {
    ws.send(Message::Text(value.to_string().into())).await.unwrap();
}

async fn recv(ws: &mut Ws) -> ServerMessage {
    let next = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => return decode_server_message(text.as_str()).unwrap(),
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                other => panic!("unexpected frame: {:?}", other),
            }
        }
    });
    next.await.expect("timed out waiting for a message")
}

async fn assert_silent(ws: &mut Ws) {
    let next = tokio::time::timeout(Duration::from_millis(200), ws.next()).await;
    assert!(next.is_err(), "expected no message, got {:?}", next);
}

fn updated(msg: ServerMessage) -> live_poll::Question {
    match msg {
        ServerMessage::UpdateQuestion { question } => question,
        other => panic!("expected update question, got {:?}", other),
    }
}

#[tokio::test]
async fn test_add_then_vote_reaches_every_client() {
    let (url, state) = start_server().await;
    let mut alice = connect(&url, &state).await;
    let mut bob = connect(&url, &state).await;

    send(&mut alice, json!({ "message": "add question", "question": "Q1" })).await;

    let added = updated(recv(&mut alice).await);
    assert_eq!(added.text, "Q1");
    assert_eq!(added.rating, 0);
    assert_eq!(updated(recv(&mut bob).await), added);

    send(
        &mut alice,
        json!({ "message": "update question", "id": added.id.as_str(), "vote": -1 }),
    )
    .await;

    let voted = updated(recv(&mut alice).await);
    assert_eq!(voted.id, added.id);
    assert_eq!(voted.text, "Q1");
    assert_eq!(voted.rating, -1);
    assert_eq!(updated(recv(&mut bob).await), voted);

    assert_silent(&mut alice).await;
    assert_silent(&mut bob).await;
}

#[tokio::test]
async fn test_snapshot_only_sent_when_questions_exist() {
    let (url, state) = start_server().await;
    let mut alice = connect(&url, &state).await;
    assert_silent(&mut alice).await;

    send(&mut alice, json!({ "message": "add question", "question": "first" })).await;
    let first = updated(recv(&mut alice).await);
    send(&mut alice, json!({ "message": "add question", "question": "second" })).await;
    recv(&mut alice).await;
    send(
        &mut alice,
        json!({ "message": "update question", "id": first.id.as_str(), "vote": 7 }),
    )
    .await;
    recv(&mut alice).await;

    let mut bob = connect(&url, &state).await;
    match recv(&mut bob).await {
        ServerMessage::Init { questions } => {
            let texts: Vec<_> = questions.iter().map(|q| q.text.as_str()).collect();
            assert_eq!(texts, vec!["first", "second"]);
            assert_eq!(questions[0].rating, 7);
            assert_eq!(questions[1].rating, 0);
        }
        other => panic!("expected init, got {:?}", other),
    }
    assert_silent(&mut bob).await;
}

#[tokio::test]
async fn test_unknown_id_and_unknown_tag_are_ignored() {
    let (url, state) = start_server().await;
    let mut alice = connect(&url, &state).await;

    send(&mut alice, json!({ "message": "add question", "question": "Q1" })).await;
    let added = updated(recv(&mut alice).await);

    send(
        &mut alice,
        json!({ "message": "update question", "id": "does-not-exist", "vote": 3 }),
    )
    .await;
    send(&mut alice, json!({ "message": "delete question", "id": added.id.as_str() })).await;
    assert_silent(&mut alice).await;

    // The connection is still usable
    send(
        &mut alice,
        json!({ "message": "update question", "id": added.id.as_str(), "vote": 2 }),
    )
    .await;
    assert_eq!(updated(recv(&mut alice).await).rating, 2);

    let state = state.lock().await;
    assert_eq!(state.questions().len(), 1);
    assert_eq!(state.connection_count(), 1);
}

#[tokio::test]
async fn test_malformed_frame_closes_only_sender() {
    let (url, state) = start_server().await;
    let mut alice = connect(&url, &state).await;
    let mut bob = connect(&url, &state).await;

    alice
        .send(Message::Text("this is not json".into()))
        .await
        .unwrap();

    let frame = tokio::time::timeout(Duration::from_secs(2), alice.next())
        .await
        .expect("timed out waiting for close");
    match frame {
        Some(Ok(Message::Close(Some(frame)))) => assert_eq!(frame.code, CloseCode::Invalid),
        other => panic!("expected close frame, got {:?}", other),
    }

    wait_for_connections(&state, 1).await;

    send(&mut bob, json!({ "message": "add question", "question": "still here" })).await;
    assert_eq!(updated(recv(&mut bob).await).text, "still here");
}

#[tokio::test]
async fn test_scripted_client_adds_and_votes() {
    let (url, state) = start_server().await;
    let mut watcher = connect(&url, &state).await;

    let voted = probe::run(&url, "Q1".to_string(), -1, Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(voted.text, "Q1");
    assert_eq!(voted.rating, -1);

    // Other clients saw both the add and the vote
    assert_eq!(updated(recv(&mut watcher).await).rating, 0);
    assert_eq!(updated(recv(&mut watcher).await), voted);

    let state = state.lock().await;
    assert_eq!(state.questions(), [voted].as_slice());
}

#[tokio::test]
async fn test_scripted_client_times_out_without_upgrade() {
    // Accepts TCP connections through the backlog but never answers the handshake
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let timeout = Duration::from_millis(300);
    let result = probe::run(&url, "Q1".to_string(), -1, timeout).await;

    match result {
        Err(PollError::Timeout(after)) => assert_eq!(after, timeout),
        other => panic!("expected timeout, got {:?}", other),
    }
    drop(listener);
}
