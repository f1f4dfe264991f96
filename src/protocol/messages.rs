//! Protocol messages for client-server communication.
//!
//! All messages are JSON objects sent as WebSocket text frames, tagged by
//! their `message` field.

use serde::{Deserialize, Serialize};

use crate::models::{Question, QuestionId};

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "message")]
pub enum ClientMessage {
    /// Create a new question with this text.
    #[serde(rename = "add question")]
    AddQuestion { question: String },

    /// Adjust the rating of an existing question.
    #[serde(rename = "update question")]
    UpdateQuestion { id: QuestionId, vote: i64 },

    /// Any other tag. Accepted and ignored.
    #[serde(other)]
    Unrecognized,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "message")]
pub enum ServerMessage {
    /// Full snapshot, sent once on connect when there is anything to send.
    #[serde(rename = "init")]
    Init { questions: Vec<Question> },

    /// Current state of one question after it was created or voted on.
    #[serde(rename = "update question")]
    UpdateQuestion { question: Question },
}

/// Default server port.
pub const DEFAULT_PORT: u16 = 5000;

/// Decode a text frame received from a client.
pub fn decode_client_message(text: &str) -> Result<ClientMessage, serde_json::Error> {
    serde_json::from_str(text)
}

/// Decode a text frame received from the server.
pub fn decode_server_message(text: &str) -> Result<ServerMessage, serde_json::Error> {
    serde_json::from_str(text)
}
