//! Explicit console context shared by every plugin.
//!
//! Holds what the page-level singleton used to: the command channel (and
//! through it the activity lock and cookies), the UI surface and the
//! Google Drive auth token. Plugins receive it as an `Arc` instead of
//! reaching for global state.

use std::sync::{Arc, RwLock};

use crate::channel::CommandChannel;
use crate::config::ConsoleConfig;
use crate::error::ConsoleResult;
use crate::render::ResponseRenderer;
use crate::session::cookies::CookieJar;
use crate::traits::{HttpClient, UiSurface};

pub struct ConsoleContext {
    channel: CommandChannel,
    ui: Arc<dyn UiSurface>,
    gauth: RwLock<Option<String>>,
}

impl std::fmt::Debug for ConsoleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleContext")
            .field("channel", &self.channel)
            .field("has_gauth", &self.gauth_token().is_some())
            .finish()
    }
}

impl ConsoleContext {
    pub fn new(channel: CommandChannel, ui: Arc<dyn UiSurface>) -> Arc<Self> {
        Arc::new(Self {
            channel,
            ui,
            gauth: RwLock::new(None),
        })
    }

    /// Build a context from configuration, loading the cookie jar from
    /// `config.cookie_path` when one is set.
    pub fn from_config(
        config: ConsoleConfig,
        http: Arc<dyn HttpClient>,
        ui: Arc<dyn UiSurface>,
    ) -> ConsoleResult<Arc<Self>> {
        let cookies = match &config.cookie_path {
            Some(path) => CookieJar::load(path.clone())?,
            None => CookieJar::in_memory(),
        };
        tracing::debug!(
            base_url = %config.base_url,
            cookies = ?cookies.names(),
            "console context ready"
        );
        let channel = CommandChannel::new(http, config, Arc::new(cookies));
        Ok(Self::new(channel, ui))
    }

    pub fn channel(&self) -> &CommandChannel {
        &self.channel
    }

    pub fn config(&self) -> &ConsoleConfig {
        self.channel.config()
    }

    pub fn ui(&self) -> &dyn UiSurface {
        self.ui.as_ref()
    }

    pub fn renderer(&self) -> ResponseRenderer<'_> {
        ResponseRenderer::new(self.ui.as_ref())
    }

    /// Google Drive access token, if the user has authorized.
    pub fn gauth_token(&self) -> Option<String> {
        self.gauth
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set_gauth_token(&self, token: Option<String>) {
        *self
            .gauth
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }
}
