//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PERSIMMON_API_URL` - Base URL of the remote account API
//!
//! ## Optional
//! - `PERSIMMON_DATA_DIR` - Directory for durable anonymous state (default: `.persimmon`)
//! - `PERSIMMON_SESSION_TOKEN` - Pre-provisioned session token; absent means anonymous mode
//! - `PERSIMMON_POLL_INTERVAL_SECS` - Payment poller interval in seconds (default: 10)

use std::path::PathBuf;
use std::time::Duration;

use persimmon_core::SessionToken;
use thiserror::Error;
use url::Url;

const DEFAULT_DATA_DIR: &str = ".persimmon";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
///
/// Implements `Debug` manually to redact the session token.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the remote account API
    pub api_url: Url,
    /// Directory holding the durable anonymous favorites file
    pub data_dir: PathBuf,
    /// Session token, if the caller is already signed in
    pub session_token: Option<SessionToken>,
    /// Payment poller check interval
    pub poll_interval: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url.as_str())
            .field("data_dir", &self.data_dir)
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any value
    /// fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url("PERSIMMON_API_URL", &get_required_env("PERSIMMON_API_URL")?)?;
        let data_dir = PathBuf::from(get_env_or_default("PERSIMMON_DATA_DIR", DEFAULT_DATA_DIR));
        let session_token = get_optional_env("PERSIMMON_SESSION_TOKEN").map(SessionToken::new);
        let poll_interval = parse_poll_interval(
            "PERSIMMON_POLL_INTERVAL_SECS",
            get_optional_env("PERSIMMON_POLL_INTERVAL_SECS").as_deref(),
        )?;

        Ok(Self {
            api_url,
            data_dir,
            session_token,
            poll_interval,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse and validate the API base URL.
fn parse_api_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("scheme must be http or https, got '{}'", url.scheme()),
        ));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "URL must have a host".to_string(),
        ));
    }

    Ok(url)
}

/// Parse the poll interval, defaulting when unset.
fn parse_poll_interval(var_name: &str, value: Option<&str>) -> Result<Duration, ConfigError> {
    let secs = match value {
        Some(raw) => {
            let secs = raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string())
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidEnvVar(
                    var_name.to_string(),
                    "interval must be at least 1 second".to_string(),
                ));
            }
            secs
        }
        None => DEFAULT_POLL_INTERVAL_SECS,
    };
    Ok(Duration::from_secs(secs))
}
