//! Dispatch of client messages onto the server state.

use crate::models::{Question, QuestionId};
use crate::protocol::{ClientMessage, ServerMessage};

use super::state::{ConnectionId, ServerState};

/// What a handled message did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A question was created and broadcast.
    Added(Question),
    /// A question was voted on and broadcast.
    Updated(Question),
    /// The vote named an id that does not exist. Nothing was sent.
    UnknownQuestion(QuestionId),
    /// The message tag was not recognized. Nothing was sent.
    Ignored,
}

/// Handle a single client message.
///
/// Every successful mutation is broadcast to all registered connections,
/// including the one that sent the message.
pub fn handle(state: &mut ServerState, connection: ConnectionId, msg: ClientMessage) -> Dispatch {
    match msg {
        ClientMessage::AddQuestion { question } => {
            tracing::info!(%connection, text = %question, "Received: add question");
            let question = state.add_question(question);
            broadcast_question(state, &question);
            Dispatch::Added(question)
        }
        ClientMessage::UpdateQuestion { id, vote } => {
            tracing::info!(%connection, %id, vote, "Received: update question");
            match state.apply_vote(&id, vote) {
                Some(question) => {
                    broadcast_question(state, &question);
                    Dispatch::Updated(question)
                }
                None => {
                    tracing::debug!(%connection, %id, "Vote for unknown question ignored");
                    Dispatch::UnknownQuestion(id)
                }
            }
        }
        ClientMessage::Unrecognized => {
            tracing::debug!(%connection, "Unrecognized message ignored");
            Dispatch::Ignored
        }
    }
}

fn broadcast_question(state: &mut ServerState, question: &Question) {
    let msg = ServerMessage::UpdateQuestion {
        question: question.clone(),
    };
    let delivered = state.broadcast(&msg);
    tracing::debug!(id = %question.id, rating = question.rating, delivered, "Sent: update question");
}
