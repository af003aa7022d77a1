//! The `error` module defines the error type shared by every part of `newt_ws`.
//!
//! Configuration, authentication and transport failures are all reported
//! through [`Error`], so callers can match on the failure class without
//! caring which layer raised it. An unrecognised message `type` is not an
//! error anywhere in this crate.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Required credential or endpoint fields are missing.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// The token service refused to issue a token.
    #[error("authentication failed: {0}")]
    AuthFailure(String),

    #[error("no session token available, authenticate first")]
    NotAuthenticated,

    /// A frame could not be decoded into the `type`/`data` shape.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    #[error("envelope data nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("expected message type {expected:?}, got {found:?}")]
    UnexpectedType { expected: String, found: String },

    #[error("payload of {kind:?} message could not be decoded: {source}")]
    Payload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed token response: {0}")]
    MalformedTokenResponse(#[source] serde_json::Error),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
}

impl Error {
    /// Whether the error was raised before any network activity took place.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::ConfigInvalid(_) | Error::ConfigLoad(_) | Error::InvalidEndpoint { .. }
        )
    }
}
