//! # newt_ws
//!
//! `newt_ws` holds the authentication and message-envelope contracts a newt
//! client uses to talk to its control plane, plus the thin collaborators that
//! put them to work: loading credentials, exchanging them for a session token,
//! and carrying `type`/`data` envelopes over a WebSocket.
//!
//! ## Core Modules
//!
//! - `config`: Loads and validates credentials and the endpoint.
//! - `auth`: Token request/response shapes, the token issuer and the session
//!   that holds the token.
//! - `transport`: The `WsMessage` envelope, endpoint URLs and the WebSocket
//!   connection.
//! - `utils`: The crate error type and logging setup.

pub mod auth;
pub mod config;
pub mod transport;
pub mod utils;

pub use crate::auth::{AuthOutcome, Session, TokenResponse};
pub use crate::config::Config;
pub use crate::transport::{Connection, MessageKind, WsMessage};
pub use crate::utils::{Error, Result};
