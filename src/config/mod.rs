//! The `config` module loads the client's credentials and endpoint.
//!
//! Values are layered the same way every time: an optional configuration
//! file, then `NEWT_*` environment variables, then explicit overrides.

mod settings;

use std::path::Path;

use ::config::{Environment, File};
use tracing::debug;

use crate::utils::Result;

use settings::RawConfig;

pub use settings::{Config, PartialConfig};

/// File consulted when no explicit path is given. The extension is detected
/// by the `config` crate, so `config/newt.toml`, `config/newt.json` and
/// friends all work.
pub const DEFAULT_CONFIG_FILE: &str = "config/newt";

/// Prefix for environment variables such as `NEWT_ID` or `NEWT_ENDPOINT`.
pub const ENV_PREFIX: &str = "NEWT";

/// Loads the configuration from the default file and environment variables.
pub fn load_config() -> Result<Config> {
    load_config_from(None)
}

/// Loads the configuration from `path` (required when given) or the default
/// file (optional), then applies `NEWT_*` environment variables on top.
pub fn load_config_from(path: Option<&Path>) -> Result<Config> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = ::config::Config::builder()
        .add_source(file)
        .add_source(Environment::with_prefix(ENV_PREFIX));

    let raw: RawConfig = builder.build()?.try_deserialize()?;
    let config = Config::from(raw);
    debug!(?config, "configuration loaded");
    Ok(config)
}

/// Loads the configuration and merges `overrides` over it.
pub fn load_config_with(path: Option<&Path>, overrides: PartialConfig) -> Result<Config> {
    let base = load_config_from(path)?;
    if overrides.is_empty() {
        return Ok(base);
    }
    Ok(overrides.apply(base))
}
