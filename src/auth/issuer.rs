use std::future::Future;

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::auth::token::{TokenRequest, TokenResponse};
use crate::transport::endpoint::token_url;
use crate::utils::{Error, Result};

/// Something that can turn credentials into a [`TokenResponse`].
pub trait TokenIssuer {
    fn issue(&self, request: &TokenRequest) -> impl Future<Output = Result<TokenResponse>> + Send;
}

pub const CSRF_HEADER: &str = "X-CSRF-Token";
pub const CSRF_VALUE: &str = "x-csrf-protection";

/// Requests tokens from the control plane over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpTokenIssuer {
    client: Client,
    url: Url,
}

impl HttpTokenIssuer {
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self::with_client(Client::new(), token_url(endpoint)?))
    }

    pub fn with_client(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl TokenIssuer for HttpTokenIssuer {
    async fn issue(&self, request: &TokenRequest) -> Result<TokenResponse> {
        debug!(url = %self.url, "posting token request");
        let response = self
            .client
            .post(self.url.clone())
            .header(CSRF_HEADER, CSRF_VALUE)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        // rejections still carry a JSON body, so the status alone decides nothing
        match serde_json::from_slice::<TokenResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(Error::AuthFailure(format!(
                "token endpoint returned {status}"
            ))),
            Err(e) => Err(Error::MalformedTokenResponse(e)),
        }
    }
}
