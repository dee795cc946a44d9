//! Console configuration.
//!
//! Use the builder pattern to customize, or [`ConsoleConfig::from_env`] to
//! pick up the `JBOX_*` environment variables.
//!
//! ```ignore
//! use jboxctl::config::ConsoleConfig;
//! use std::time::Duration;
//!
//! let config = ConsoleConfig::default()
//!     .with_base_url("https://juliabox.example.org")
//!     .with_request_timeout(Duration::from_secs(10));
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConsoleResult, SystemError};
use crate::session::cookies::default_cookie_path;

/// Environment variable holding the backend base URL.
pub const ENV_URL: &str = "JBOX_URL";

/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT: &str = "JBOX_TIMEOUT_SECS";

/// Environment variable holding the cookie jar path.
pub const ENV_COOKIES: &str = "JBOX_COOKIES";

/// Environment variable holding the homework endpoint path.
pub const ENV_HOMEWORK: &str = "JBOX_HW_ENDPOINT";

/// Settings shared by every console operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleConfig {
    /// Backend origin, without trailing slash (default: http://localhost)
    pub base_url: String,
    /// Deadline for locked calls (default: 30s)
    pub request_timeout: Duration,
    /// Keep-alive period (default: 60s)
    pub ping_interval: Duration,
    /// Consecutive ping failures tolerated before forced logout (default: 1)
    pub max_ping_fails: u32,
    /// Cookie jar file; `None` keeps cookies in memory only
    pub cookie_path: Option<PathBuf>,
    /// Homework plugin endpoint (default: /jboxplugin/hw/)
    pub homework_endpoint: String,
    /// User-Agent sent with every request
    pub user_agent: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            request_timeout: Duration::from_secs(30),
            ping_interval: Duration::from_secs(60),
            max_ping_fails: 1,
            cookie_path: default_cookie_path().ok(),
            homework_endpoint: "/jboxplugin/hw/".to_string(),
            user_agent: concat!("jboxctl/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ConsoleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend origin. A trailing slash is dropped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    pub fn with_max_ping_fails(mut self, max: u32) -> Self {
        self.max_ping_fails = max;
        self
    }

    pub fn with_cookie_path(mut self, path: Option<PathBuf>) -> Self {
        self.cookie_path = path;
        self
    }

    /// Set the homework endpoint (`/hw/` on older hosts).
    pub fn with_homework_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.homework_endpoint = endpoint.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Absolute URL for a backend path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Defaults overridden by `JBOX_URL`, `JBOX_TIMEOUT_SECS`,
    /// `JBOX_COOKIES` and `JBOX_HW_ENDPOINT`.
    pub fn from_env() -> ConsoleResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var(ENV_URL) {
            if !url.trim().is_empty() {
                config = config.with_base_url(url.trim());
            }
        }

        if let Ok(raw) = std::env::var(ENV_TIMEOUT) {
            let secs: u64 = raw.trim().parse().map_err(|_| SystemError::EnvironmentError {
                variable: ENV_TIMEOUT.to_string(),
                message: format!("'{}' is not a whole number of seconds", raw),
            })?;
            if secs == 0 {
                return Err(SystemError::EnvironmentError {
                    variable: ENV_TIMEOUT.to_string(),
                    message: "timeout must be positive".to_string(),
                }
                .into());
            }
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        if let Ok(path) = std::env::var(ENV_COOKIES) {
            if !path.trim().is_empty() {
                config = config.with_cookie_path(Some(PathBuf::from(path.trim())));
            }
        }

        if let Ok(endpoint) = std::env::var(ENV_HOMEWORK) {
            if !endpoint.trim().is_empty() {
                config = config.with_homework_endpoint(endpoint.trim());
            }
        }

        Ok(config)
    }
}
