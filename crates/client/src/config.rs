//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `MEDICART_API_URL` - Base URL of the API server (default: `http://localhost:3003`)
//! - `MEDICART_DATA_DIR` - Directory for local storage (default: `.medicart`)
//! - `MEDICART_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 30)
//! - `MEDICART_CHAT_MAX_LENGTH` - Maximum chat message length in characters (default: 200)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3003";
const DEFAULT_DATA_DIR: &str = ".medicart";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default maximum chat message length, in characters.
pub const DEFAULT_CHAT_MAX_LENGTH: usize = 200;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API server
    pub api_url: Url,
    /// Directory holding the local storage files
    pub data_dir: PathBuf,
    /// Timeout applied to every API request
    pub request_timeout: Duration,
    /// Longest chat message accepted, in characters
    pub chat_max_length: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            chat_max_length: DEFAULT_CHAT_MAX_LENGTH,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = get_env_or_default("MEDICART_API_URL", DEFAULT_API_URL);
        let api_url = Url::parse(&api_url).map_err(|e| {
            ConfigError::InvalidEnvVar("MEDICART_API_URL".to_string(), e.to_string())
        })?;
        let data_dir = PathBuf::from(get_env_or_default("MEDICART_DATA_DIR", DEFAULT_DATA_DIR));
        let request_timeout = parse_env(
            "MEDICART_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )
        .map(Duration::from_secs)?;
        let chat_max_length = parse_env("MEDICART_CHAT_MAX_LENGTH", DEFAULT_CHAT_MAX_LENGTH)?;

        if chat_max_length == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "MEDICART_CHAT_MAX_LENGTH".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            data_dir,
            request_timeout,
            chat_max_length,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
