//! Host administration: SSH key, invite codes, upgrade and statistics.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::{OpResult, Operation};
use crate::channel::Params;
use crate::context::ConsoleContext;
use crate::envelope::{data_text, CodePolicy, Outcome};
use crate::error::{ApiError, ConsoleResult};
use crate::render::invites_grid;

const ENDPOINT: &str = "/hostadmin/";
const SSH_KEY: &str = "/hostupload/sshkey";

const FETCH_KEY: Operation = Operation::get(SSH_KEY, "retrieving the ssh key");
const INVITES: Operation = Operation::get(ENDPOINT, "showing invite codes");
const MAKE_INVITE: Operation =
    Operation::post("/hostadmin?action=make_invite", "creating invite code");
const UPGRADE: Operation = Operation::get(ENDPOINT, "upgrading");
const STATS: Operation =
    Operation::get(ENDPOINT, "retrieving statistics").with_policy(CodePolicy::NoDataOnOne);
const INSTANCE_INFO: Operation = Operation::get(ENDPOINT, "retrieving instance information");
const SHOW_CFG: Operation = Operation::get(ENDPOINT, "retrieving configuration");
const SWITCH_IMAGE: Operation = Operation::get(ENDPOINT, "switching julia image");

pub const UPGRADE_STARTED: &str = "Upgrade initiated. You have been logged out. \
                                   Press Ok to log in again and complete the upgrade.";

/// Which instance report to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceInfo {
    /// Average and per-instance load.
    Load,
    /// Sessions per instance.
    Sessions,
}

impl InstanceInfo {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceInfo::Load => "load",
            InstanceInfo::Sessions => "sessions",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            InstanceInfo::Load => "Instance Load",
            InstanceInfo::Sessions => "Sessions",
        }
    }
}

impl fmt::Display for InstanceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn unexpected(action: &str) -> String {
    format!(
        "Oops. Unexpected error while {}.\n\nPlease try again later.",
        action
    )
}

pub struct AdminPlugin {
    ctx: Arc<ConsoleContext>,
}

impl AdminPlugin {
    pub fn new(ctx: Arc<ConsoleContext>) -> Self {
        Self { ctx }
    }

    /// Show the container's public SSH key. Whatever the backend answers
    /// is shown verbatim.
    pub async fn show_ssh_key(&self) -> OpResult {
        let renderer = self.ctx.renderer();
        match FETCH_KEY.run(&self.ctx, Params::new()).await {
            Ok(outcome) => {
                let text = match &outcome {
                    Outcome::Ok(data) | Outcome::Warning(data) => {
                        data_text(data).unwrap_or_default()
                    }
                    Outcome::Error(reason) => reason.clone().unwrap_or_default(),
                    Outcome::NoData => String::new(),
                };
                renderer.preformatted("", text).await;
                Ok(outcome)
            }
            Err(err) => {
                renderer.ui().alert(&unexpected(FETCH_KEY.action)).await;
                Err(err)
            }
        }
    }

    /// Show every invite code with its limits and usage.
    pub async fn invites_report(&self) -> OpResult {
        let renderer = self.ctx.renderer();
        let params = Params::new().with("action", "invites_report");
        match INVITES.run(&self.ctx, params).await {
            Ok(outcome) => {
                match &outcome {
                    Outcome::Ok(data) => renderer.dialog("", &invites_grid(data)).await,
                    other => {
                        renderer
                            .outcome_failure(INVITES.feedback, INVITES.action, other)
                            .await
                    }
                }
                Ok(outcome)
            }
            Err(err) => {
                renderer
                    .ui()
                    .alert("Oops. Unexpected error occured while showing invite codes")
                    .await;
                Err(err)
            }
        }
    }

    /// Create an invite code. `expires_on` is passed through as typed;
    /// `max_count` of `None` means unlimited.
    pub async fn make_invite(
        &self,
        invite_code: &str,
        expires_on: &str,
        max_count: Option<u32>,
    ) -> OpResult {
        let params = Params::new()
            .with("invite_code", invite_code.trim())
            .with("expires_on", expires_on.trim())
            .with("max_count", max_count.map(|n| n.to_string()).unwrap_or_default());

        let outcome = MAKE_INVITE.run_reported(&self.ctx, params).await?;
        if outcome.is_ok() {
            tracing::info!(invite_code, "invite code created");
            self.ctx
                .ui()
                .alert(&format!("Created invite code {}.", invite_code.trim()))
                .await;
        }
        Ok(outcome)
    }

    /// Move the container to the latest image. The session ends, so on
    /// success the user is sent back to the login page.
    pub async fn upgrade(&self) -> OpResult {
        let ui = self.ctx.ui();
        let result = UPGRADE.run(&self.ctx, Params::new().with("upgrade_id", "me")).await;
        match &result {
            Ok(Outcome::Ok(_)) => {
                tracing::info!("upgrade initiated");
                ui.alert(UPGRADE_STARTED).await;
                ui.navigate("/");
            }
            _ => ui.alert(&unexpected(UPGRADE.action)).await,
        }
        result
    }

    /// Show the named statistic. The backend answers code 1 when nothing
    /// has been recorded for it yet.
    pub async fn stats(&self, name: &str) -> OpResult {
        let renderer = self.ctx.renderer();
        let outcome = STATS.run_reported(&self.ctx, Params::new().with("stats", name)).await?;
        match &outcome {
            Outcome::Ok(data) => renderer.table("Statistics", data.clone()).await,
            Outcome::NoData => {
                renderer
                    .ui()
                    .alert(&format!("No statistics recorded for {}.", name))
                    .await
            }
            _ => {}
        }
        Ok(outcome)
    }

    pub async fn instance_info(&self, which: InstanceInfo) -> OpResult {
        let params = Params::new().with("instance_info", which);
        self.show_table(&INSTANCE_INFO, params, which.title()).await
    }

    /// Show the host configuration. Admins only.
    pub async fn show_cfg(&self) -> OpResult {
        self.show_table(&SHOW_CFG, Params::new().with("show_cfg", 1), "Configuration")
            .await
    }

    /// Toggle between the plain and the precompiled Julia image. Resolves
    /// to the new image type.
    pub async fn switch_julia_img(&self) -> ConsoleResult<i64> {
        let outcome = SWITCH_IMAGE
            .run_reported(&self.ctx, Params::new().with("switch_julia_img", 1))
            .await?;
        match outcome {
            Outcome::Ok(Value::Number(n)) if n.is_i64() => {
                let image_type = n.as_i64().unwrap_or_default();
                tracing::info!(image_type, "julia image switched");
                Ok(image_type)
            }
            Outcome::Ok(other) => Err(ApiError::UnexpectedPayload {
                action: SWITCH_IMAGE.action.to_string(),
                message: format!("expected an image type, got {}", other),
            }
            .into()),
            Outcome::Error(reason) => {
                Err(ApiError::rejected(SWITCH_IMAGE.action, -1, reason).into())
            }
            Outcome::Warning(_) | Outcome::NoData => {
                Err(ApiError::rejected(SWITCH_IMAGE.action, 1, None).into())
            }
        }
    }

    async fn show_table(&self, op: &Operation, params: Params, title: &str) -> OpResult {
        let outcome = op.run_reported(&self.ctx, params).await?;
        if let Outcome::Ok(data) = &outcome {
            self.ctx.renderer().table(title, data.clone()).await;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockResponse;
    use crate::plugins::testing::Harness;
    use crate::render::invites::INVITES_HEADING;
    use crate::traits::DialogContent;
    use serde_json::json;

    fn url() -> String {
        Harness::url(ENDPOINT)
    }

    #[tokio::test]
    async fn test_ssh_key_shown_verbatim() {
        let harness = Harness::new();
        harness.http.set_response(
            &Harness::url(SSH_KEY),
            MockResponse::envelope(0, json!("ssh-rsa AAAA juser@box")),
        );
        let plugin = AdminPlugin::new(harness.ctx.clone());

        plugin.show_ssh_key().await.unwrap();
        assert_eq!(
            harness.ui.dialogs(),
            vec![(
                String::new(),
                DialogContent::Preformatted("ssh-rsa AAAA juser@box".to_string())
            )]
        );
    }

    #[tokio::test]
    async fn test_ssh_key_transport_failure() {
        let harness = Harness::new();
        harness
            .http
            .set_response(&Harness::url(SSH_KEY), MockResponse::status(500));
        let plugin = AdminPlugin::new(harness.ctx.clone());

        assert!(plugin.show_ssh_key().await.is_err());
        assert_eq!(
            harness.ui.alerts(),
            vec!["Oops. Unexpected error while retrieving the ssh key.\n\nPlease try again later."]
        );
    }

    #[tokio::test]
    async fn test_invites_report_grid() {
        let harness = Harness::new();
        harness.http.set_response(
            &url(),
            MockResponse::envelope(
                0,
                json!([{"invite_code": "abc", "max_count": 0, "count": 3,
                        "time_created": "bogus", "expires_on": "never"}]),
            ),
        );
        let plugin = AdminPlugin::new(harness.ctx.clone());

        plugin.invites_report().await.unwrap();
        let request = &harness.http.get_requests()[0];
        assert_eq!(request.url, "http://mock/hostadmin/?action=invites_report");

        let (_, content) = harness.ui.dialogs().remove(0);
        match content {
            DialogContent::Grid { heading, rows, .. } => {
                assert_eq!(heading, INVITES_HEADING);
                assert_eq!(rows, vec![vec!["abc", "bogus", "Unlimited", "never", "3"]]);
            }
            other => panic!("unexpected dialog {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_make_invite_posts_form() {
        let harness = Harness::new();
        harness.http.set_response(
            &Harness::url("/hostadmin?action=make_invite"),
            MockResponse::envelope(0, json!(null)),
        );
        let plugin = AdminPlugin::new(harness.ctx.clone());

        plugin
            .make_invite(" spring ", "2026-12-31T00:00:00Z", None)
            .await
            .unwrap();
        let request = &harness.http.get_requests()[0];
        assert_eq!(request.method, "POST");
        assert_eq!(request.url, "http://mock/hostadmin?action=make_invite");
        assert_eq!(request.param("invite_code").as_deref(), Some("spring"));
        assert_eq!(request.param("max_count").as_deref(), Some(""));
        assert_eq!(harness.ui.alerts(), vec!["Created invite code spring."]);
    }

    #[tokio::test]
    async fn test_upgrade_success_navigates_home() {
        let harness = Harness::new();
        harness
            .http
            .set_response(&url(), MockResponse::envelope(0, json!("")));
        let plugin = AdminPlugin::new(harness.ctx.clone());

        plugin.upgrade().await.unwrap();
        assert_eq!(harness.ui.alerts(), vec![UPGRADE_STARTED]);
        assert_eq!(harness.ui.navigations(), vec!["/"]);
        assert_eq!(
            harness.http.get_requests()[0].param("upgrade_id").as_deref(),
            Some("me")
        );
    }

    #[tokio::test]
    async fn test_upgrade_failures_share_wording() {
        let harness = Harness::new();
        harness
            .http
            .push_response(&url(), MockResponse::envelope(-1, json!("no")));
        harness.http.push_response(&url(), MockResponse::status(502));
        let plugin = AdminPlugin::new(harness.ctx.clone());

        plugin.upgrade().await.unwrap();
        assert!(plugin.upgrade().await.is_err());
        let oops = "Oops. Unexpected error while upgrading.\n\nPlease try again later.";
        assert_eq!(harness.ui.alerts(), vec![oops, oops]);
        assert!(harness.ui.navigations().is_empty());
    }

    #[tokio::test]
    async fn test_stats_outcomes() {
        let harness = Harness::new();
        harness
            .http
            .push_response(&url(), MockResponse::envelope(0, json!({"day": 3})));
        harness
            .http
            .push_response(&url(), MockResponse::envelope(1, json!({})));
        harness.http.push_response(
            &url(),
            MockResponse::envelope(-1, json!("You do not have permissions to view these stats")),
        );
        let plugin = AdminPlugin::new(harness.ctx.clone());

        assert!(plugin.stats("stat_sessions").await.unwrap().is_ok());
        assert_eq!(plugin.stats("disk").await.unwrap(), Outcome::NoData);
        assert!(plugin.stats("disk").await.unwrap().is_error());

        assert_eq!(
            harness.ui.dialogs(),
            vec![("Statistics".to_string(), DialogContent::Table(json!({"day": 3})))]
        );
        assert_eq!(
            harness.ui.alerts(),
            vec![
                "No statistics recorded for disk.",
                "Error retrieving statistics. You do not have permissions to view these stats",
            ]
        );
    }

    #[tokio::test]
    async fn test_instance_info_and_cfg_tables() {
        let harness = Harness::new();
        harness
            .http
            .set_response(&url(), MockResponse::envelope(0, json!({"Average Load": 0.5})));
        let plugin = AdminPlugin::new(harness.ctx.clone());

        plugin.instance_info(InstanceInfo::Load).await.unwrap();
        plugin.instance_info(InstanceInfo::Sessions).await.unwrap();
        plugin.show_cfg().await.unwrap();

        let requests = harness.http.get_requests();
        assert_eq!(requests[0].param("instance_info").as_deref(), Some("load"));
        assert_eq!(requests[1].param("instance_info").as_deref(), Some("sessions"));
        assert_eq!(requests[2].param("show_cfg").as_deref(), Some("1"));
        let titles: Vec<String> = harness.ui.dialogs().into_iter().map(|(t, _)| t).collect();
        assert_eq!(titles, vec!["Instance Load", "Sessions", "Configuration"]);
    }

    #[tokio::test]
    async fn test_switch_julia_img() {
        let harness = Harness::new();
        harness.http.push_response(&url(), MockResponse::envelope(0, json!(4)));
        harness
            .http
            .push_response(&url(), MockResponse::envelope(0, json!("x")));
        let plugin = AdminPlugin::new(harness.ctx.clone());

        assert_eq!(plugin.switch_julia_img().await.unwrap(), 4);
        let err = plugin.switch_julia_img().await.unwrap_err();
        assert_eq!(err.error_code(), "E_API_PAYLOAD");
    }
}
