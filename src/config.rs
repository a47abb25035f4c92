use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.volby.cz/pls/ps2017nss/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime settings, overridable through `VOLBY_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Origin that relative report links are resolved against.
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_env(Environment::with_prefix("VOLBY").try_parsing(true))
    }

    fn from_env(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default(
                "user_agent",
                concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    /// The base as a directory URL, so relative report links join below it.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Message(format!("invalid base_url {:?}: {}", self.base_url, e)))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
