use serde::{Deserialize, Deserializer, Serialize};

use crate::config::Config;
use crate::utils::{Error, Result};

/// Body of the token-issuing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    #[serde(rename = "newtId")]
    pub identifier: String,
    pub secret: String,
}

impl TokenRequest {
    pub fn from_config(config: &Config) -> Self {
        Self {
            identifier: config.identifier.clone(),
            secret: config.secret.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenData {
    #[serde(deserialize_with = "null_as_default")]
    pub token: String,
}

/// Response of the token-issuing call.
///
/// Missing or `null` fields decode to their zero value, and `data` may be
/// `null` on rejection. Read the token through [`TokenResponse::outcome`], never
/// straight from `data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
    pub data: Option<TokenData>,
    #[serde(deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A token response reduced to what a client may act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success { token: String },
    Failure { message: String },
}

impl TokenResponse {
    pub fn issued(token: impl Into<String>) -> Self {
        Self {
            data: Some(TokenData {
                token: token.into(),
            }),
            success: true,
            message: String::new(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            data: None,
            success: false,
            message: message.into(),
        }
    }

    pub fn outcome(&self) -> AuthOutcome {
        self.clone().into_outcome()
    }

    /// `Success` only when `success` is set and a non-empty token came with it.
    pub fn into_outcome(self) -> AuthOutcome {
        let token = self.data.map(|d| d.token).unwrap_or_default();
        if self.success && !token.is_empty() {
            return AuthOutcome::Success { token };
        }

        let message = if !self.message.is_empty() {
            self.message
        } else if self.success {
            "token response reported success without a token".to_string()
        } else {
            "token request was rejected".to_string()
        };
        AuthOutcome::Failure { message }
    }
}

impl From<TokenResponse> for AuthOutcome {
    fn from(response: TokenResponse) -> Self {
        response.into_outcome()
    }
}

impl AuthOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success { .. })
    }

    pub fn into_result(self) -> Result<String> {
        match self {
            AuthOutcome::Success { token } => Ok(token),
            AuthOutcome::Failure { message } => Err(Error::AuthFailure(message)),
        }
    }
}
