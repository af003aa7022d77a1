//! The `auth` module turns configured credentials into a session token.
//!
//! `token` holds the wire shapes of the token exchange, `issuer` performs the
//! exchange, and `session` keeps the resulting token for the connection.

pub mod issuer;
pub mod session;
pub mod token;

pub use issuer::{HttpTokenIssuer, TokenIssuer};
pub use session::{Session, SessionToken};
pub use token::{AuthOutcome, TokenData, TokenRequest, TokenResponse};
