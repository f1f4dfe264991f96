//! Poll client module.
//!
//! Provides the interactive terminal client and a scripted probe.

mod client;
pub mod probe;
mod state;
mod ui;

pub use client::run;
pub use state::{ClientApp, ConnectionStatus, InputMode};
