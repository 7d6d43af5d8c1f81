//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_AUTH_THROTTLE_SECS: u64 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STORAGE_PATH: &str = ".hireveu/storage.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// REST API root, without a trailing slash.
    pub api_base_url: String,
    /// OAuth client ID for the hosted Google sign-in widget, if configured.
    pub google_client_id: Option<String>,
    /// Minimum interval between redundant bootstrap checks.
    pub auth_throttle: Duration,
    pub timeouts: Timeouts,
    /// File backing the local key/value store (consent, pending verification).
    pub storage_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            google_client_id: None,
            auth_throttle: Duration::from_secs(DEFAULT_AUTH_THROTTLE_SECS),
            timeouts: Timeouts::default(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `HIREVEU_API_BASE_URL`: default `http://localhost:5000/api`
    /// - `HIREVEU_GOOGLE_CLIENT_ID`: unset disables Google login
    /// - `HIREVEU_AUTH_THROTTLE_SECS`: default 5
    /// - `HIREVEU_REQUEST_TIMEOUT_SECS`: default 30
    /// - `HIREVEU_CONNECT_TIMEOUT_SECS`: default 10
    /// - `HIREVEU_STORAGE_PATH`: default `.hireveu/storage.json`
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = normalize_base_url(
            &std::env::var("HIREVEU_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned()),
        )?;
        let google_client_id = std::env::var("HIREVEU_GOOGLE_CLIENT_ID")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let auth_throttle = Duration::from_secs(env_parse_u64("HIREVEU_AUTH_THROTTLE_SECS", DEFAULT_AUTH_THROTTLE_SECS));
        let timeouts = Timeouts {
            request_secs: env_parse_u64("HIREVEU_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("HIREVEU_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let storage_path =
            PathBuf::from(std::env::var("HIREVEU_STORAGE_PATH").unwrap_or_else(|_| DEFAULT_STORAGE_PATH.to_owned()));

        Ok(Self { api_base_url, google_client_id, auth_throttle, timeouts, storage_path })
    }

    /// Replace the base URL, validating it the same way `from_env` does.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not an absolute http(s) URL.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_base_url = normalize_base_url(raw)?;
        Ok(self)
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

pub(crate) fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidBaseUrl { url: raw.to_owned(), reason: e.to_string() })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_owned(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
