use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use crate::auth::issuer::TokenIssuer;
use crate::auth::token::TokenRequest;
use crate::config::Config;
use crate::utils::{Error, Result};

/// Shared, synchronized holder of the session token.
///
/// Clones share the same cell. Writes take the lock exclusively, so a token
/// adopted by one task is visible to every clone afterwards.
#[derive(Clone, Default)]
pub struct SessionToken {
    inner: Arc<RwLock<Option<String>>>,
}

impl SessionToken {
    /// An empty `initial` leaves the cell unset.
    pub fn new(initial: &str) -> Self {
        let token = SessionToken::default();
        if !initial.is_empty() {
            token.set(initial);
        }
        token
    }

    pub fn get(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_set(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *slot = (!token.is_empty()).then_some(token);
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("set", &self.is_set())
            .finish()
    }
}

/// A validated configuration paired with its session token.
///
/// The configuration is read-only once the session exists; only the token
/// changes, through [`SessionToken`].
#[derive(Debug, Clone)]
pub struct Session {
    config: Arc<Config>,
    token: SessionToken,
}

impl Session {
    /// Validates `config` and seeds the token cell from `config.token`.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        if config.tls_client_cert().is_some() {
            warn!("tlsClientCert is set but client certificates are not loaded by this client");
        }
        let token = SessionToken::new(&config.token);
        Ok(Self {
            config: Arc::new(config),
            token,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn token(&self) -> Option<String> {
        self.token.get()
    }

    pub fn token_cell(&self) -> &SessionToken {
        &self.token
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_set()
    }

    /// Returns the current token, requesting one from `issuer` when none is
    /// held. A rejected request leaves the session unauthenticated.
    pub async fn authenticate<I: TokenIssuer>(&self, issuer: &I) -> Result<String> {
        if let Some(token) = self.token.get() {
            return Ok(token);
        }
        if !self.config.has_secret_credentials() {
            return Err(Error::ConfigInvalid(
                "no session token and no newtId/secret to request one".into(),
            ));
        }

        info!(id = %self.config.identifier, "requesting session token");
        let response = issuer.issue(&TokenRequest::from_config(&self.config)).await?;
        match response.into_outcome().into_result() {
            Ok(token) => {
                self.token.set(token.clone());
                info!(id = %self.config.identifier, "session token issued");
                Ok(token)
            }
            Err(e) => {
                warn!(id = %self.config.identifier, "{e}");
                Err(e)
            }
        }
    }

    /// Drops the current token so the next `authenticate` requests a new one.
    pub fn invalidate(&self) {
        self.token.clear();
    }
}
