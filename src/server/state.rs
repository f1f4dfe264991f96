//! Server state management.
//!
//! This module holds the question list and the registry of open
//! connections. Everything here is owned by a single [`ServerState`] that the
//! server keeps behind one mutex, so every mutation and every broadcast is
//! serialized.

use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::models::{Question, QuestionId};
use crate::protocol::ServerMessage;

/// Identifier of one open connection.
pub type ConnectionId = Uuid;

/// Channel used to push messages to one connection's writer task.
pub type ConnectionSender = mpsc::UnboundedSender<ServerMessage>;

/// A registered client connection.
pub struct ClientConnection {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Remote address.
    pub peer_addr: SocketAddr,
    sender: ConnectionSender,
}

impl ClientConnection {
    pub fn new(peer_addr: SocketAddr, sender: ConnectionSender) -> Self {
        Self {
            id: Uuid::new_v4(),
            peer_addr,
            sender,
        }
    }

    /// Queue a message for this connection. Returns false once the writer is gone.
    pub fn send(&self, msg: ServerMessage) -> bool {
        self.sender.send(msg).is_ok()
    }
}

/// Main server state.
#[derive(Default)]
pub struct ServerState {
    /// Questions in insertion order. Ids are unique.
    questions: Vec<Question>,
    /// Open connections by connection ID.
    connections: HashMap<ConnectionId, ClientConnection>,
}

impl ServerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current questions in insertion order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// The `init` message for a new client, or `None` when there are no questions.
    pub fn snapshot(&self) -> Option<ServerMessage> {
        if self.questions.is_empty() {
            return None;
        }
        Some(ServerMessage::Init {
            questions: self.questions.clone(),
        })
    }

    /// Register a new connection and queue its snapshot.
    pub fn register(&mut self, peer_addr: SocketAddr, sender: ConnectionSender) -> ConnectionId {
        let connection = ClientConnection::new(peer_addr, sender);
        let id = connection.id;

        if let Some(init) = self.snapshot() {
            connection.send(init);
        }

        self.connections.insert(id, connection);
        id
    }

    /// Remove a connection from the registry.
    pub fn unregister(&mut self, id: ConnectionId) -> bool {
        self.connections.remove(&id).is_some()
    }

    /// Append a new unrated question with a fresh id.
    pub fn add_question(&mut self, text: String) -> Question {
        let mut id = QuestionId::generate();
        while self.find(&id).is_some() {
            id = QuestionId::generate();
        }

        let question = Question::new(id, text);
        self.questions.push(question.clone());
        question
    }

    /// Add `vote` to the rating of the question with this id.
    ///
    /// Returns the updated question, or `None` if no question has this id.
    pub fn apply_vote(&mut self, id: &QuestionId, vote: i64) -> Option<Question> {
        let question = self.questions.iter_mut().find(|q| &q.id == id)?;
        question.apply_vote(vote);
        Some(question.clone())
    }

    fn find(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }

    /// Broadcast a message to every open connection.
    ///
    /// Connections whose writer has gone away are dropped from the registry.
    /// Returns the number of connections the message was queued for.
    pub fn broadcast(&mut self, msg: &ServerMessage) -> usize {
        let mut delivered = 0;
        self.connections.retain(|id, connection| {
            if connection.send(msg.clone()) {
                delivered += 1;
                true
            } else {
                tracing::debug!(connection = %id, peer = %connection.peer_addr, "Pruning closed connection");
                false
            }
        });
        delivered
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[test]
    fn test_add_question_assigns_distinct_ids() {
        let mut state = ServerState::new();
        let ids: HashSet<_> = (0..50)
            .map(|i| {
                let q = state.add_question(format!("Q{}", i));
                assert_eq!(q.rating, 0);
                q.id
            })
            .collect();
        assert_eq!(ids.len(), 50);
        assert_eq!(state.questions().len(), 50);
        assert_eq!(state.questions()[0].text, "Q0");
        assert_eq!(state.questions()[49].text, "Q49");
    }

    #[test]
    fn test_apply_vote() {
        let mut state = ServerState::new();
        let q = state.add_question("Q1".to_string());

        let updated = state.apply_vote(&q.id, -1).unwrap();
        assert_eq!(updated.rating, -1);
        let updated = state.apply_vote(&q.id, 3).unwrap();
        assert_eq!(updated.rating, 2);
        assert_eq!(state.questions()[0].rating, 2);
    }

    #[test]
    fn test_apply_vote_unknown_id() {
        let mut state = ServerState::new();
        state.add_question("Q1".to_string());
        let before = state.questions().to_vec();

        assert!(state.apply_vote(&"missing".into(), 1).is_none());
        assert_eq!(state.questions(), before.as_slice());
    }

    #[test]
    fn test_register_sends_snapshot_only_when_non_empty() {
        let mut state = ServerState::new();

        let (tx, mut rx) = mpsc::unbounded_channel();
        state.register(peer(), tx);
        assert!(rx.try_recv().is_err());

        let q = state.add_question("Q1".to_string());
        state.apply_vote(&q.id, 4);

        let (tx, mut rx) = mpsc::unbounded_channel();
        state.register(peer(), tx);
        match rx.try_recv().unwrap() {
            ServerMessage::Init { questions } => {
                assert_eq!(questions.len(), 1);
                assert_eq!(questions[0].rating, 4);
            }
            other => panic!("unexpected message: {:?}", other),
        }
        assert!(rx.try_recv().is_err());
        assert_eq!(state.connection_count(), 2);
    }

    #[test]
    fn test_broadcast_prunes_closed_connections() {
        let mut state = ServerState::new();

        let (tx_open, mut rx_open) = mpsc::unbounded_channel();
        let (tx_closed, rx_closed) = mpsc::unbounded_channel();
        state.register(peer(), tx_open);
        state.register(peer(), tx_closed);
        drop(rx_closed);

        let question = state.add_question("Q1".to_string());
        let delivered = state.broadcast(&ServerMessage::UpdateQuestion { question });

        assert_eq!(delivered, 1);
        assert_eq!(state.connection_count(), 1);
        assert!(matches!(
            rx_open.try_recv(),
            Ok(ServerMessage::UpdateQuestion { .. })
        ));
    }

    #[test]
    fn test_unregister() {
        let mut state = ServerState::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = state.register(peer(), tx);

        assert!(state.unregister(id));
        assert!(!state.unregister(id));
        assert_eq!(state.connection_count(), 0);
    }
}
