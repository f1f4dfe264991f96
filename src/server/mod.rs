//! Poll server module.
//!
//! Provides the WebSocket server that owns the question list and fans
//! updates out to every connected client.

mod router;
mod server;
mod state;

pub use router::{handle, Dispatch};
pub use server::{run, serve, SharedState};
pub use state::{ClientConnection, ConnectionId, ConnectionSender, ServerState};
