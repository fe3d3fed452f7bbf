//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `LUXTIME_API_URL` - Marketplace API base URL (default `http://localhost:8000`)
//! - `LUXTIME_STORAGE_PATH` - JSON file holding the session token and
//!   favorites (default `$HOME/.luxtime/storage.json`)
//! - `LUXTIME_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: none)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Base URL used when `LUXTIME_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL. Endpoint paths are appended to it verbatim.
    pub api_url: Url,
    /// Location of the durable key-value store.
    pub storage_path: PathBuf,
    /// Per-request timeout. `None` waits as long as the transport allows.
    pub timeout: Option<Duration>,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl ClientConfig {
    /// Configuration for an API at `api_url`, with everything else defaulted.
    #[must_use]
    pub fn new(api_url: Url, storage_path: impl Into<PathBuf>) -> Self {
        Self {
            api_url,
            storage_path: storage_path.into(),
            timeout: None,
            user_agent: default_user_agent(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first if one is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value or no
    /// storage location can be derived.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(get_optional_env)
    }

    /// Build configuration from an arbitrary variable source.
    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = var("LUXTIME_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(raw_url.trim()).map_err(|e| {
            ConfigError::InvalidEnvVar("LUXTIME_API_URL".to_string(), e.to_string())
        })?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "LUXTIME_API_URL".to_string(),
                format!("unsupported scheme {}", api_url.scheme()),
            ));
        }

        let storage_path = match var("LUXTIME_STORAGE_PATH").filter(|p| !p.is_empty()) {
            Some(path) => PathBuf::from(path),
            None => var("HOME")
                .filter(|home| !home.is_empty())
                .map(|home| PathBuf::from(home).join(".luxtime").join("storage.json"))
                .ok_or_else(|| ConfigError::MissingEnvVar("LUXTIME_STORAGE_PATH".to_string()))?,
        };

        let timeout = var("LUXTIME_HTTP_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .ok_or_else(|| {
                        ConfigError::InvalidEnvVar(
                            "LUXTIME_HTTP_TIMEOUT_SECS".to_string(),
                            format!("expected a positive number of seconds, got {raw:?}"),
                        )
                    })
            })
            .transpose()?;

        Ok(Self {
            api_url,
            storage_path,
            timeout,
            user_agent: default_user_agent(),
        })
    }

    /// The base URL without a trailing slash, ready for endpoint paths.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.api_url.as_str().trim_end_matches('/').to_string()
    }
}

fn default_user_agent() -> String {
    format!("luxtime-client/{}", env!("CARGO_PKG_VERSION"))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
