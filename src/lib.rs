//! # live-poll
//!
//! A real-time question poll served over WebSocket.
//!
//! The server keeps a list of questions in memory. Clients add questions and
//! vote on them, and every change is pushed to every connected client.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use live_poll::server::{serve, ServerState};
//! use tokio::net::TcpListener;
//! use tokio::sync::Mutex;
//!
//! # async fn example() -> Result<(), live_poll::PollError> {
//! let listener = TcpListener::bind("127.0.0.1:5000").await?;
//! let state = Arc::new(Mutex::new(ServerState::new()));
//!
//! // Serve until Ctrl-C
//! serve(listener, state, async {
//!     let _ = tokio::signal::ctrl_c().await;
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
mod error;
pub mod logging;
mod models;
pub mod protocol;
pub mod server;
pub mod terminal;

pub use error::PollError;
pub use models::{Question, QuestionId};
