mod messages;

pub use messages::{
    decode_client_message, decode_server_message, ClientMessage, ServerMessage, DEFAULT_PORT,
};
