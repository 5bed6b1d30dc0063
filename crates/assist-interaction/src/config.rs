//! Client configuration.
//!
//! Read from `~/.config/portal-assist/config.toml`, then overridden by
//! environment variables. A missing file means defaults.
//!
//! ```toml
//! endpoint = "https://portal.example.org/api/assistant/search/stream"
//! portal_base_url = "https://portal.example.org"
//! connect_timeout_secs = 10
//! ```

use assist_core::{AssistError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/api/assistant/search/stream";
pub const DEFAULT_PORTAL_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Overrides `endpoint`.
pub const ENDPOINT_ENV: &str = "PORTAL_ASSIST_ENDPOINT";
/// Overrides `portal_base_url`.
pub const BASE_URL_ENV: &str = "PORTAL_ASSIST_BASE_URL";

/// Settings of the stream client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Streaming search endpoint (POST, `text/event-stream` response).
    pub endpoint: String,
    /// Portal root that deep links are joined onto.
    pub portal_base_url: String,
    /// Connect timeout of the HTTP client. The stream itself has no timeout.
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            portal_base_url: DEFAULT_PORTAL_BASE_URL.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Loads the config file at the default location and applies
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let config = Self::load_from_path(&config_path()?)?;
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Loads a config file; a missing or empty file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            AssistError::config(format!(
                "Failed to read configuration file at {}: {}",
                path.display(),
                e
            ))
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        toml::from_str(&content).map_err(|e| {
            AssistError::config(format!(
                "Failed to parse configuration file at {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies overrides looked up by variable name.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
            self.endpoint = endpoint;
        }
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.portal_base_url = base_url;
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_portal_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.portal_base_url = base_url.into();
        self
    }

    /// Checks that the endpoint is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.endpoint).map_err(|e| {
            AssistError::config(format!("invalid endpoint '{}': {}", self.endpoint, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AssistError::config(format!(
                "endpoint must use http or https, got '{}'",
                url.scheme()
            )));
        }
        Ok(())
    }
}

/// Returns the path to the configuration file: ~/.config/portal-assist/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AssistError::config("Could not determine home directory"))?;
    Ok(home.join(".config").join("portal-assist").join("config.toml"))
}
