//! The `transport` module covers everything that crosses the connection
//! boundary: the `type`/`data` envelope, endpoint URLs, and the WebSocket
//! connection that carries envelopes in both directions.

pub mod endpoint;
pub mod message;
pub mod websocket;

pub use message::{MAX_DEPTH, MessageKind, WsMessage};
pub use websocket::Connection;

#[cfg(test)]
mod websocket_tests;
