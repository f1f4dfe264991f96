//! Command-line configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::protocol::DEFAULT_PORT;

/// Real-time question polling over WebSocket.
#[derive(Parser, Debug)]
#[command(name = "live-poll", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the poll server
    Serve(ServeArgs),
    /// Open the interactive terminal client
    Client(ConnectArgs),
    /// Add a question, vote on it once and print what the server sends
    Probe(ProbeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl ServeArgs {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    /// Server host
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl ConnectArgs {
    /// WebSocket URL of the server.
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    /// Text of the question to add
    #[arg(long, default_value = "Question1")]
    pub question: String,

    /// Vote to apply to the first question update received
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub vote: i64,

    /// Seconds to wait for the whole exchange
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl ProbeArgs {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
