use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::{Error, Result};

/// Credentials and connection target for one client instance.
///
/// Field names follow the keys used in configuration files (`newtId`,
/// `secret`, `token`, `endpoint`, `tlsClientCert`). Empty strings mean
/// "not set", matching how the values arrive from files and environment.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Stable identifier for this client instance.
    #[serde(rename = "newtId")]
    pub identifier: String,

    /// Shared secret exchanged for a session token.
    pub secret: String,

    /// Pre-issued session token, empty when one must be requested.
    pub token: String,

    /// Base address of the control plane.
    pub endpoint: String,

    /// Client certificate material for mutual TLS, if any.
    #[serde(rename = "tlsClientCert")]
    pub tls_client_cert: String,
}

impl Config {
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// Whether identifier and secret are both present, so a token can be requested.
    pub fn has_secret_credentials(&self) -> bool {
        !self.identifier.is_empty() && !self.secret.is_empty()
    }

    pub fn tls_client_cert(&self) -> Option<&str> {
        (!self.tls_client_cert.is_empty()).then_some(self.tls_client_cert.as_str())
    }

    /// Checks that an endpoint is set and that at least one way to
    /// authenticate is available.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(Error::ConfigInvalid("endpoint must be set".into()));
        }
        if !self.has_token() && !self.has_secret_credentials() {
            return Err(Error::ConfigInvalid(
                "either a token or both newtId and secret must be set".into(),
            ));
        }
        Ok(())
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() { "" } else { "<redacted>" }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("identifier", &self.identifier)
            .field("secret", &redact(&self.secret))
            .field("token", &redact(&self.token))
            .field("endpoint", &self.endpoint)
            .field("tls_client_cert", &self.tls_client_cert)
            .finish()
    }
}

/// Values as they come out of the layered sources.
///
/// Files use the wire spellings (`newtId`, `tlsClientCert`; some formats
/// lowercase them) while `NEWT_*` variables arrive as `id` and
/// `tls_client_cert`. Both spellings can be present at once, so they are kept
/// apart here and the environment spelling wins.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawConfig {
    #[serde(rename = "newtId", alias = "newtid", alias = "newt_id")]
    newt_id: Option<String>,
    id: Option<String>,
    secret: Option<String>,
    token: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "tlsClientCert", alias = "tlsclientcert")]
    tls_client_cert_file: Option<String>,
    tls_client_cert: Option<String>,
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Config {
            identifier: raw.id.or(raw.newt_id).unwrap_or_default(),
            secret: raw.secret.unwrap_or_default(),
            token: raw.token.unwrap_or_default(),
            endpoint: raw.endpoint.unwrap_or_default(),
            tls_client_cert: raw
                .tls_client_cert
                .or(raw.tls_client_cert_file)
                .unwrap_or_default(),
        }
    }
}

/// Partial configuration used to override loaded values.
///
/// Every field is optional; `None` keeps whatever the base configuration holds.
#[derive(Debug, Default, Clone)]
pub struct PartialConfig {
    pub identifier: Option<String>,
    pub secret: Option<String>,
    pub token: Option<String>,
    pub endpoint: Option<String>,
    pub tls_client_cert: Option<String>,
}

impl PartialConfig {
    /// Merges the set fields over `base`.
    pub fn apply(self, base: Config) -> Config {
        Config {
            identifier: self.identifier.unwrap_or(base.identifier),
            secret: self.secret.unwrap_or(base.secret),
            token: self.token.unwrap_or(base.token),
            endpoint: self.endpoint.unwrap_or(base.endpoint),
            tls_client_cert: self.tls_client_cert.unwrap_or(base.tls_client_cert),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.identifier.is_none()
            && self.secret.is_none()
            && self.token.is_none()
            && self.endpoint.is_none()
            && self.tls_client_cert.is_none()
    }
}
