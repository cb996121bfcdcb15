//! # Client Configuration
//!
//! Configuration is read from environment variables and validated on load so
//! a misconfigured deployment fails before the first request.
//!
//! | Variable | Default |
//! |---|---|
//! | `NOTEMARKET_ENV` | `development` |
//! | `NOTEMARKET_API_URL` | per environment, see [`Environment::default_api_url`] |
//! | `NOTEMARKET_WS_URL` | API URL with `http` → `ws` |
//! | `NOTEMARKET_HTTP_TIMEOUT_SECS` | `10` (`0` disables the timeout) |
//! | `NOTEMARKET_CACHE_STALE_SECS` | `60` |
//! | `NOTEMARKET_CACHE_GC_SECS` | `300` |
//! | `NOTEMARKET_CACHE_RETRY` | `1` |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::cache::CacheOptions;
use crate::core::error::ApiError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} has an invalid value")]
    WrongFormat(&'static str),
    #[error("Unknown environment '{0}' (expected development, staging or production)")]
    UnknownEnvironment(String),
    #[error("{0}")]
    Invalid(String),
}

/// Deployment environment selecting the default backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn default_api_url(&self) -> &'static str {
        match self {
            Environment::Development => "http://localhost:3000",
            Environment::Staging => "https://api.staging.notemarket.app",
            Environment::Production => "https://api.notemarket.app",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub environment: Environment,
    /// REST base URL without trailing slash
    pub api_url: String,
    /// Socket base URL (`ws://` or `wss://`) without trailing slash
    pub ws_url: String,
    pub http_timeout: Option<Duration>,
    pub cache: CacheOptions,
}

impl ClientConfig {
    /// Defaults for a given environment, no env vars consulted.
    pub fn for_environment(environment: Environment) -> Self {
        Self::with_api_url(environment.default_api_url()).with_environment(environment)
    }

    /// Config pointing at an explicit backend (tests, ad hoc tools).
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            environment: Environment::default(),
            ws_url: derive_ws_url(&api_url),
            api_url,
            http_timeout: Some(Duration::from_secs(10)),
            cache: CacheOptions::default(),
        }
    }

    fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("NOTEMARKET_ENV") {
            Ok(value) => value.parse()?,
            Err(_) => Environment::default(),
        };

        let mut config = match env::var("NOTEMARKET_API_URL") {
            Ok(url) => Self::with_api_url(url).with_environment(environment),
            Err(_) => Self::for_environment(environment),
        };

        if let Ok(ws_url) = env::var("NOTEMARKET_WS_URL") {
            config.ws_url = ws_url.trim_end_matches('/').to_string();
        }

        if let Some(secs) = env_parse::<u64>("NOTEMARKET_HTTP_TIMEOUT_SECS")? {
            config.http_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(secs) = env_parse::<u64>("NOTEMARKET_CACHE_STALE_SECS")? {
            config.cache.stale_time = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>("NOTEMARKET_CACHE_GC_SECS")? {
            config.cache.gc_time = Duration::from_secs(secs);
        }
        if let Some(retry) = env_parse::<u32>("NOTEMARKET_CACHE_RETRY")? {
            config.cache.retry = retry;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "API URL must start with http:// or https:// (got '{}')",
                self.api_url
            )));
        }
        if !(self.ws_url.starts_with("ws://") || self.ws_url.starts_with("wss://")) {
            return Err(ConfigError::Invalid(format!(
                "WebSocket URL must start with ws:// or wss:// (got '{}')",
                self.ws_url
            )));
        }
        if self.cache.gc_time < self.cache.stale_time {
            return Err(ConfigError::Invalid(
                "Cache GC window must not be shorter than the stale window".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::Config(err.to_string())
    }
}

/// `http://host` → `ws://host`, `https://host` → `wss://host`.
pub fn derive_ws_url(api_url: &str) -> String {
    if let Some(rest) = api_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = api_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        api_url.to_string()
    }
}

/// Parse an optional environment variable; absent is `Ok(None)`.
fn env_parse<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::WrongFormat(name)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_ws_url() {
        assert_eq!(derive_ws_url("http://localhost:3000"), "ws://localhost:3000");
        assert_eq!(derive_ws_url("https://api.notemarket.app"), "wss://api.notemarket.app");
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("Staging".parse::<Environment>().unwrap(), Environment::Staging);
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn test_with_api_url_trims_slash() {
        let config = ClientConfig::with_api_url("http://127.0.0.1:4000/");
        assert_eq!(config.api_url, "http://127.0.0.1:4000");
        assert_eq!(config.ws_url, "ws://127.0.0.1:4000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_gc_window() {
        let mut config = ClientConfig::for_environment(Environment::Production);
        config.cache.gc_time = Duration::from_secs(10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let config = ClientConfig::with_api_url("ftp://example.com");
        assert!(config.validate().is_err());
    }
}
