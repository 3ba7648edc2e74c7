//! Gateway configuration.
//!
//! This module holds the knobs for the session gateway: where the admin API
//! lives, how long a session may sit idle, and the HTTP request timeout.
//!
//! Values come from `Default` and may be overridden through environment
//! variables (a `.env` file is honored if present).

use std::time::Duration;

use anyhow::{Context, Result};

/// Default base URL for the admin REST API.
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Inactivity timeout in minutes.
/// Sessions are force-ended after this long with no user input.
const INACTIVITY_TIMEOUT_MINUTES: u64 = 15;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Cooldown in milliseconds before the logout guard is released.
/// Long enough to absorb a burst of 401s from parallel in-flight requests,
/// short enough that a genuine follow-up logout is not blocked.
const LOGOUT_COOLDOWN_MS: u64 = 500;

/// Environment variable overriding the API base URL.
const ENV_API_BASE_URL: &str = "ADMIN_API_BASE_URL";

/// Environment variable overriding the inactivity timeout (in minutes).
const ENV_INACTIVITY_TIMEOUT: &str = "ADMIN_INACTIVITY_TIMEOUT_MINUTES";

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL all relative API paths are resolved against.
    pub api_base_url: String,
    /// How long a session may sit with no activity before it is ended.
    pub inactivity_timeout: Duration,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// How long the logout single-flight guard stays held after a teardown.
    pub logout_cooldown: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            inactivity_timeout: Duration::from_secs(INACTIVITY_TIMEOUT_MINUTES * 60),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            logout_cooldown: Duration::from_millis(LOGOUT_COOLDOWN_MS),
        }
    }
}

impl GatewayConfig {
    /// Config pointed at the given API base URL, defaults for everything else.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Load the default config with environment overrides applied.
    ///
    /// Reads a `.env` file if one is present (silently ignored if not).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();
        if let Ok(url) = std::env::var(ENV_API_BASE_URL) {
            config.api_base_url = url;
        }
        if let Ok(minutes) = std::env::var(ENV_INACTIVITY_TIMEOUT) {
            let minutes: u64 = minutes.parse().with_context(|| {
                format!("{} must be a whole number of minutes", ENV_INACTIVITY_TIMEOUT)
            })?;
            config.inactivity_timeout = Duration::from_secs(minutes * 60);
        }
        Ok(config)
    }
}
