//! URL construction for the token service and the WebSocket endpoint.

use url::Url;

use crate::utils::{Error, Result};

pub const TOKEN_PATH: &str = "/api/v1/auth/newt/get-token";
pub const WEBSOCKET_PATH: &str = "/api/v1/ws";
pub const CLIENT_TYPE: &str = "newt";

fn invalid(endpoint: &str, reason: impl Into<String>) -> Error {
    Error::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: reason.into(),
    }
}

/// Parses the configured endpoint. Accepts `http`, `https`, `ws` and `wss`
/// URLs with a host; query and fragment are dropped.
pub fn base_url(endpoint: &str) -> Result<Url> {
    let mut url = Url::parse(endpoint.trim()).map_err(|e| invalid(endpoint, e.to_string()))?;
    match url.scheme() {
        "http" | "https" | "ws" | "wss" => {}
        other => return Err(invalid(endpoint, format!("unsupported scheme {other:?}"))),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid(endpoint, "missing host"));
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn join_path(url: &mut Url, suffix: &str) {
    let prefix = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{prefix}{suffix}"));
}

/// HTTP(S) address of the token-issuing call.
pub fn token_url(endpoint: &str) -> Result<Url> {
    let mut url = base_url(endpoint)?;
    let scheme = match url.scheme() {
        "ws" => "http",
        "wss" => "https",
        other => other,
    }
    .to_string();
    url.set_scheme(&scheme)
        .map_err(|()| invalid(endpoint, "cannot switch to http scheme"))?;
    join_path(&mut url, TOKEN_PATH);
    Ok(url)
}

/// WebSocket address carrying the session token in the query string.
pub fn websocket_url(endpoint: &str, token: &str) -> Result<Url> {
    let mut url = base_url(endpoint)?;
    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => other,
    }
    .to_string();
    url.set_scheme(&scheme)
        .map_err(|()| invalid(endpoint, "cannot switch to websocket scheme"))?;
    join_path(&mut url, WEBSOCKET_PATH);
    url.query_pairs_mut()
        .append_pair("token", token)
        .append_pair("clientType", CLIENT_TYPE);
    Ok(url)
}
