//! Scripted smoke client.
//!
//! Adds a question, votes on the first question update it sees and waits
//! for that vote to come back as a broadcast.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use crate::error::PollError;
use crate::models::{Question, QuestionId};
use crate::protocol::{decode_server_message, ClientMessage, ServerMessage};

/// Run the probe against `url`, giving up after `timeout`.
///
/// Returns the question as broadcast after the vote was applied.
pub async fn run(url: &str, question: String, vote: i64, timeout: Duration) -> Result<Question, PollError> {
    tokio::time::timeout(timeout, probe(url, question, vote))
        .await
        .map_err(|_| PollError::Timeout(timeout))?
}

async fn probe(url: &str, question: String, vote: i64) -> Result<Question, PollError> {
    let (ws_stream, _) = tokio_tungstenite::connect_async(url).await?;
    tracing::info!(url, "Connected");

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let add = serde_json::to_string(&ClientMessage::AddQuestion { question })?;
    ws_sender.send(Message::Text(add.into())).await?;

    let mut voted: Option<QuestionId> = None;

    while let Some(msg) = ws_receiver.next().await {
        let text = match msg? {
            Message::Text(text) => text,
            Message::Close(frame) => {
                let reason = frame.map(|f| f.reason.as_str().to_string()).unwrap_or_default();
                return Err(PollError::ConnectionClosed(reason));
            }
            _ => continue,
        };

        tracing::info!("Incoming: {}", text.as_str());

        let ServerMessage::UpdateQuestion { question } = decode_server_message(text.as_str())? else {
            continue;
        };

        match &voted {
            None => {
                let update = serde_json::to_string(&ClientMessage::UpdateQuestion {
                    id: question.id.clone(),
                    vote,
                })?;
                ws_sender.send(Message::Text(update.into())).await?;
                voted = Some(question.id);
            }
            Some(id) if *id == question.id => {
                let _ = ws_sender.close().await;
                return Ok(question);
            }
            Some(_) => {}
        }
    }

    Err(PollError::ConnectionClosed("stream ended".to_string()))
}
