//! Feature plugins.
//!
//! Every plugin follows the same four steps: assemble parameters, pass an
//! optional confirmation gate, issue the command, render the outcome. The
//! fixed parts of each command (endpoint, verb, how its codes are read,
//! whether it locks, where failures are reported) are declared once as an
//! [`Operation`] and shared by the plugin functions.
//!
//! | Plugin | Endpoint |
//! |--------|----------|
//! | [`admin`] | `/hostadmin/`, `/hostupload/sshkey` |
//! | [`cluster`] | `/jboxplugin/par/` |
//! | [`volume`] | `/jboxplugin/ebsdatavol/` |
//! | [`api_admin`] | `/jboxplugin/api_admin/` |
//! | [`user_admin`] | `/jboxplugin/user_admin/` |
//! | [`filesync`] | `/hostupload/sync` |
//! | [`homework`] | `/jboxplugin/hw/` (configurable) |

pub mod admin;
pub mod api_admin;
pub mod cluster;
pub mod filesync;
pub mod homework;
pub mod user_admin;
pub mod volume;

pub use admin::{AdminPlugin, InstanceInfo};
pub use api_admin::{is_valid_name, is_valid_url, ApiAdminPlugin};
pub use cluster::ClusterPlugin;
pub use filesync::{folder_location, FileSyncPlugin};
pub use homework::HomeworkPlugin;
pub use user_admin::UserAdminPlugin;
pub use volume::VolumePlugin;

use crate::channel::{CallOptions, Method, Params};
use crate::context::ConsoleContext;
use crate::envelope::{CodePolicy, Outcome};
use crate::error::ConsoleResult;
use crate::render::Feedback;

/// Typed outcome of one command, or why it never produced one.
pub type OpResult = ConsoleResult<Outcome>;

/// Static description of one backend command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub endpoint: &'static str,
    pub method: Method,
    /// Gerund phrase used in failure wording, e.g. "configuring cluster".
    pub action: &'static str,
    pub policy: CodePolicy,
    pub lock: bool,
    pub feedback: Feedback,
}

impl Operation {
    /// A locked GET reporting through popups with the strict code policy.
    pub const fn get(endpoint: &'static str, action: &'static str) -> Self {
        Self {
            endpoint,
            method: Method::Get,
            action,
            policy: CodePolicy::Strict,
            lock: true,
            feedback: Feedback::Popup,
        }
    }

    /// A locked POST reporting through popups with the strict code policy.
    pub const fn post(endpoint: &'static str, action: &'static str) -> Self {
        Self {
            method: Method::Post,
            ..Self::get(endpoint, action)
        }
    }

    pub const fn unlocked(mut self) -> Self {
        self.lock = false;
        self
    }

    pub const fn with_policy(mut self, policy: CodePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub const fn inline(mut self) -> Self {
        self.feedback = Feedback::Inline;
        self
    }

    fn options(&self) -> CallOptions {
        if self.lock {
            CallOptions::locked()
        } else {
            CallOptions::unlocked()
        }
    }

    /// Issue the command and classify its envelope. Nothing is rendered.
    pub async fn run(&self, ctx: &ConsoleContext, params: Params) -> OpResult {
        self.run_at(ctx, self.endpoint, params).await
    }

    /// [`run`](Self::run) against an endpoint chosen at runtime.
    pub async fn run_at(&self, ctx: &ConsoleContext, endpoint: &str, params: Params) -> OpResult {
        let envelope = ctx
            .channel()
            .call(endpoint, self.method, params, self.options())
            .await?;
        let outcome = self.policy.classify(envelope);
        tracing::debug!(action = self.action, outcome = outcome.label(), "command finished");
        Ok(outcome)
    }

    /// Issue the command and render failures with the shared wording.
    /// Success rendering is left to the caller.
    pub async fn run_reported(&self, ctx: &ConsoleContext, params: Params) -> OpResult {
        let renderer = ctx.renderer();
        match self.run(ctx, params).await {
            Ok(outcome) => {
                renderer
                    .outcome_failure(self.feedback, self.action, &outcome)
                    .await;
                Ok(outcome)
            }
            Err(err) => {
                renderer.error(self.feedback, self.action, &err).await;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for plugin tests.

    use std::sync::Arc;

    use crate::adapters::mock::{MockHttpClient, RecordingSurface};
    use crate::channel::CommandChannel;
    use crate::config::ConsoleConfig;
    use crate::context::ConsoleContext;
    use crate::session::cookies::CookieJar;

    pub const BASE: &str = "http://mock";

    pub struct Harness {
        pub ctx: Arc<ConsoleContext>,
        pub http: MockHttpClient,
        pub ui: RecordingSurface,
    }

    impl Harness {
        pub fn new() -> Self {
            Self::with_surface(RecordingSurface::new())
        }

        pub fn with_surface(ui: RecordingSurface) -> Self {
            let http = MockHttpClient::new();
            let config = ConsoleConfig::default()
                .with_base_url(BASE)
                .with_cookie_path(None);
            let channel = CommandChannel::new(
                Arc::new(http.clone()),
                config,
                Arc::new(CookieJar::in_memory()),
            );
            let ctx = ConsoleContext::new(channel, Arc::new(ui.clone()));
            Self { ctx, http, ui }
        }

        pub fn url(path: &str) -> String {
            format!("{}{}", BASE, path)
        }
    }
}
