//! Options shared by every subcommand.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use super::surface::OutputFormat;
use crate::config::ConsoleConfig;
use crate::error::{ConsoleResult, SystemError};

/// Environment variable holding a Google Drive access token.
pub const ENV_GAUTH: &str = "JBOX_GAUTH_TOKEN";

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Backend origin (overrides JBOX_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,

    /// Request timeout in seconds (overrides JBOX_TIMEOUT_SECS)
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Cookie jar file (overrides JBOX_COOKIES)
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "no_cookies")]
    pub cookies: Option<PathBuf>,

    /// Keep cookies in memory only
    #[arg(long, global = true)]
    pub no_cookies: bool,

    /// Dialog output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Google Drive access token (overrides JBOX_GAUTH_TOKEN)
    #[arg(long, global = true, value_name = "TOKEN")]
    pub gauth_token: Option<String>,
}

impl GlobalArgs {
    /// Apply the flags on top of `base`.
    pub fn apply(&self, base: ConsoleConfig) -> ConsoleResult<ConsoleConfig> {
        let mut config = base;
        if let Some(url) = &self.url {
            config = config.with_base_url(url.trim());
        }
        if let Some(secs) = self.timeout {
            if secs == 0 {
                return Err(SystemError::EnvironmentError {
                    variable: "--timeout".to_string(),
                    message: "timeout must be positive".to_string(),
                }
                .into());
            }
            config = config.with_request_timeout(Duration::from_secs(secs));
        }
        if self.no_cookies {
            config = config.with_cookie_path(None);
        } else if let Some(path) = &self.cookies {
            config = config.with_cookie_path(Some(path.clone()));
        }
        Ok(config)
    }

    /// Drive token from the flag, then the environment.
    pub fn gauth(&self) -> Option<String> {
        self.gauth_token
            .clone()
            .or_else(|| std::env::var(ENV_GAUTH).ok())
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }
}
