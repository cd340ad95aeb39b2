//! Client configuration.
//!
//! A `ClientConfig` is built once and handed to `QueryRecordClient::new`;
//! nothing reads process-wide state after that.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8081/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

pub const ENV_BASE_URL: &str = "QUERY_RECORDS_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "QUERY_RECORDS_TIMEOUT_MS";
pub const ENV_HEALTH_TIMEOUT_MS: &str = "QUERY_RECORDS_HEALTH_TIMEOUT_MS";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive number of milliseconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
    #[error("base URL must not be empty")]
    EmptyBaseUrl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Budget for every data operation.
    pub request_timeout: Duration,
    /// Budget for `check_connection`.
    pub health_check_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            health_check_timeout: DEFAULT_HEALTH_CHECK_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Trailing slashes are stripped so paths can be appended verbatim.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_health_check_timeout(mut self, timeout: Duration) -> Self {
        self.health_check_timeout = timeout;
        self
    }

    /// Defaults overridden by `QUERY_RECORDS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_BASE_URL) {
            if url.trim().is_empty() {
                return Err(ConfigError::EmptyBaseUrl);
            }
            config = config.with_base_url(url.trim());
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            config.request_timeout = parse_millis(ENV_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_HEALTH_TIMEOUT_MS) {
            config.health_check_timeout = parse_millis(ENV_HEALTH_TIMEOUT_MS, &raw)?;
        }
        Ok(config)
    }
}

fn parse_millis(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidTimeout {
            var,
            value: raw.to_string(),
        }),
    }
}
