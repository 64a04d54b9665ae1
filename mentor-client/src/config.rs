//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use mentor_cache::CacheConfig;
use mentor_core::constants::{
    DEFAULT_BASE_URL, ENV_API_URL, ENV_CACHE_DIR, ENV_ENABLE_CACHE, ENV_GENERATION_TIMEOUT_SECS,
    ENV_POLLING_TIMEOUT_SECS, ENV_SWEEP_INTERVAL_SECS, ENV_TIMEOUT_SECS, GENERATION_TIMEOUT,
    POLLING_TIMEOUT, SESSION_TIMEOUT, STANDARD_TIMEOUT,
};
use mentor_core::{EndpointClass, MentorError, Result};

/// Timeout budgets per endpoint class.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub standard: Duration,
    pub polling: Duration,
    pub generation: Duration,
    /// Budget for asking the session provider for a token
    pub session: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            standard: STANDARD_TIMEOUT,
            polling: POLLING_TIMEOUT,
            generation: GENERATION_TIMEOUT,
            session: SESSION_TIMEOUT,
        }
    }
}

impl TimeoutConfig {
    /// Returns the budget for an endpoint class.
    pub fn for_class(&self, class: EndpointClass) -> Duration {
        match class {
            EndpointClass::Standard => self.standard,
            EndpointClass::Polling => self.polling,
            EndpointClass::Generation => self.generation,
        }
    }
}

/// Configuration of an [`ApiClient`](crate::ApiClient).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL, without trailing path
    pub base_url: String,
    pub timeouts: TimeoutConfig,
    /// When false, every read goes to the network
    pub enable_cache: bool,
    pub cache: CacheConfig,
    /// Directory of the persistent store; in-memory when unset
    pub cache_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeouts: TimeoutConfig::default(),
            enable_cache: true,
            cache: CacheConfig::default(),
            cache_dir: None,
        }
    }
}

impl ClientConfig {
    /// Creates a config for the given base URL with default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Reads configuration from the environment, loading `.env` first.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        let config = Self {
            base_url: std::env::var(ENV_API_URL).unwrap_or(defaults.base_url),
            timeouts: TimeoutConfig {
                standard: env_secs(ENV_TIMEOUT_SECS)?.unwrap_or(defaults.timeouts.standard),
                polling: env_secs(ENV_POLLING_TIMEOUT_SECS)?.unwrap_or(defaults.timeouts.polling),
                generation: env_secs(ENV_GENERATION_TIMEOUT_SECS)?
                    .unwrap_or(defaults.timeouts.generation),
                session: defaults.timeouts.session,
            },
            enable_cache: std::env::var(ENV_ENABLE_CACHE)
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            cache: CacheConfig {
                sweep_interval_seconds: env_secs(ENV_SWEEP_INTERVAL_SECS)?
                    .map(|d| d.as_secs())
                    .unwrap_or(defaults.cache.sweep_interval_seconds),
                ..defaults.cache
            },
            cache_dir: std::env::var_os(ENV_CACHE_DIR).map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    /// Disables the response cache.
    pub fn no_cache(mut self) -> Self {
        self.enable_cache = false;
        self
    }

    /// Persists the teaching-examples cache under `dir`.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Checks the base URL and budgets.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| MentorError::ConfigError(format!("invalid base URL '{}': {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(MentorError::ConfigError(format!(
                "base URL must be http or https, got '{}'",
                url.scheme()
            )));
        }

        let t = &self.timeouts;
        if [t.standard, t.polling, t.generation, t.session].iter().any(Duration::is_zero) {
            return Err(MentorError::ConfigError("timeouts must be greater than zero".into()));
        }
        if self.cache.sweep_interval_seconds == 0 {
            return Err(MentorError::ConfigError("sweep interval must be greater than zero".into()));
        }
        Ok(())
    }

    /// Joins the base URL and an endpoint path (with query).
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache.sweep_interval_seconds)
    }
}

fn env_secs(key: &str) -> Result<Option<Duration>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| MentorError::ConfigError(format!("{key} must be a number of seconds, got '{raw}'"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.enable_cache);
        assert_eq!(config.timeouts.for_class(EndpointClass::Generation), GENERATION_TIMEOUT);
    }

    #[test]
    fn test_rejects_bad_url() {
        assert!(ClientConfig::new("not a url").validate().is_err());
        assert!(ClientConfig::new("ftp://example.com").validate().is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = ClientConfig::default();
        config.timeouts.polling = Duration::ZERO;
        assert!(matches!(config.validate(), Err(MentorError::ConfigError(_))));
    }

    #[test]
    fn test_url_for_trims_slash() {
        let config = ClientConfig::new("https://mentor.example.com/");
        assert_eq!(config.url_for("/api/progress"), "https://mentor.example.com/api/progress");
    }
}
