//! Client state management.

use crate::models::Question;
use crate::protocol::{ClientMessage, ServerMessage};

/// Longest question the compose box accepts.
pub const MAX_QUESTION_LENGTH: usize = 200;

/// Connection status of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Connecting to server.
    Connecting,
    /// Connected and receiving updates.
    Connected,
    /// Disconnected from server.
    Disconnected { message: String },
}

/// What keyboard input currently does.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Moving through the list and voting.
    #[default]
    Browsing,
    /// Typing a new question.
    Composing { input: String },
}

/// Client application state.
pub struct ClientApp {
    /// Connection status.
    pub status: ConnectionStatus,
    /// Local copy of the server's questions, in server order.
    pub questions: Vec<Question>,
    /// Index of the highlighted question.
    pub selected: usize,
    /// Current input mode.
    pub mode: InputMode,
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Whether the client should quit.
    pub should_quit: bool,
}

impl ClientApp {
    /// Create a new client app.
    pub fn new(host: String, port: u16) -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            questions: Vec::new(),
            selected: 0,
            mode: InputMode::Browsing,
            host,
            port,
            should_quit: false,
        }
    }

    /// Get the server address string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// WebSocket URL of the server.
    pub fn server_url(&self) -> String {
        format!("ws://{}", self.server_addr())
    }

    pub fn mark_connected(&mut self) {
        self.status = ConnectionStatus::Connected;
    }

    /// Move to disconnected state.
    pub fn disconnect(&mut self, message: String) {
        self.status = ConnectionStatus::Disconnected { message };
    }

    /// Apply a message from the server to the local question list.
    pub fn apply(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Init { questions } => {
                self.questions = questions;
            }
            ServerMessage::UpdateQuestion { question } => {
                match self.questions.iter_mut().find(|q| q.id == question.id) {
                    Some(existing) => *existing = question,
                    None => self.questions.push(question),
                }
            }
        }
        self.clamp_selection();
    }

    /// Highest-rated question, the first one on ties.
    pub fn top_question(&self) -> Option<&Question> {
        self.questions
            .iter()
            .reduce(|best, q| if q.rating > best.rating { q } else { best })
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.questions.len().saturating_sub(1));
    }

    pub fn select_next(&mut self) {
        if !self.questions.is_empty() {
            self.selected = (self.selected + 1) % self.questions.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.questions.is_empty() {
            self.selected = (self.selected + self.questions.len() - 1) % self.questions.len();
        }
    }

    /// The highlighted question, if any.
    pub fn selected_question(&self) -> Option<&Question> {
        self.questions.get(self.selected)
    }

    /// Build a vote message for the highlighted question.
    pub fn vote_selected(&self, vote: i64) -> Option<ClientMessage> {
        self.selected_question().map(|q| ClientMessage::UpdateQuestion {
            id: q.id.clone(),
            vote,
        })
    }

    pub fn start_composing(&mut self) {
        self.mode = InputMode::Composing {
            input: String::new(),
        };
    }

    pub fn cancel_composing(&mut self) {
        self.mode = InputMode::Browsing;
    }

    /// Add a character to the question being composed.
    pub fn compose_push(&mut self, c: char) {
        if let InputMode::Composing { input } = &mut self.mode {
            if input.chars().count() < MAX_QUESTION_LENGTH {
                input.push(c);
            }
        }
    }

    /// Remove a character from the question being composed.
    pub fn compose_pop(&mut self) {
        if let InputMode::Composing { input } = &mut self.mode {
            input.pop();
        }
    }

    /// Finish composing. Returns the message to send, unless the input is blank.
    pub fn submit_composing(&mut self) -> Option<ClientMessage> {
        let InputMode::Composing { input } = std::mem::take(&mut self.mode) else {
            return None;
        };
        let question = input.trim().to_string();
        if question.is_empty() {
            return None;
        }
        Some(ClientMessage::AddQuestion { question })
    }
}
