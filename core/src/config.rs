//! Start-up configuration.
//!
//! Values come from the process environment once, at composition time, and
//! are immutable afterwards. `from_lookup` takes the lookup as a function so
//! tests never touch real environment variables.

use std::time::Duration;

use crate::error::ApiError;
use crate::mock::MockLatency;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";

pub const ENV_API_BASE_URL: &str = "PAWLOG_API_BASE_URL";
pub const ENV_USE_MOCK_API: &str = "PAWLOG_USE_MOCK_API";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "PAWLOG_REQUEST_TIMEOUT_MS";
pub const ENV_MOCK_LATENCY: &str = "PAWLOG_MOCK_LATENCY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// Selects the in-memory mock instead of the HTTP transport.
    pub use_mock_api: bool,
    /// No timeout when `None`.
    pub request_timeout: Option<Duration>,
    pub mock_latency: MockLatency,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            use_mock_api: false,
            request_timeout: None,
            mock_latency: MockLatency::realistic(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = lookup(ENV_API_BASE_URL)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_base_url);

        // Only the literal "true" enables the mock.
        let use_mock_api = lookup(ENV_USE_MOCK_API).is_some_and(|v| v.trim() == "true");

        let request_timeout = match lookup(ENV_REQUEST_TIMEOUT_MS) {
            Some(raw) => {
                let millis: u64 = raw.trim().parse().map_err(|_| {
                    ApiError::Config(format!("{ENV_REQUEST_TIMEOUT_MS} must be an integer, got {raw:?}"))
                })?;
                (millis > 0).then(|| Duration::from_millis(millis))
            }
            None => defaults.request_timeout,
        };

        let mock_latency = match lookup(ENV_MOCK_LATENCY).as_deref().map(str::trim) {
            None | Some("") | Some("realistic") => MockLatency::realistic(),
            Some("none") => MockLatency::none(),
            Some(other) => {
                return Err(ApiError::Config(format!(
                    "{ENV_MOCK_LATENCY} must be \"realistic\" or \"none\", got {other:?}"
                )))
            }
        };

        Ok(Self {
            api_base_url,
            use_mock_api,
            request_timeout,
            mock_latency,
        })
    }
}
