//! Git and Google Drive folder synchronization.
//!
//! All actions POST to `/hostupload/sync` and report through the in-page
//! alert region. Git add and sync distinguish a partial success (code 1)
//! from failure; Drive actions do not. Drive actions carry the Google
//! auth token and ask the user to authorize first when there is none.

use std::sync::Arc;

use super::{OpResult, Operation};
use crate::channel::Params;
use crate::context::ConsoleContext;
use crate::envelope::{CodePolicy, Outcome};
use crate::error::{ConsoleError, ConsoleResult};
use crate::gate::{confirm_then_act, Gated, OpGuard};
use crate::picker::{DialogOptions, FolderPicker, FOLDER_MIME};
use crate::render::Feedback;
use crate::traits::AlertLevel;

const ENDPOINT: &str = "/hostupload/sync";

/// Embedded view listing the synchronized folders.
pub const SYNC_VIEW: &str = "filesync-frame";

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this repository?";
pub const AUTHORIZE_PROMPT: &str =
    "You must authorize JuliaBox to access Google Drive. Would you like to do that now?";
pub const AUTHORIZE_LOCATION: &str = "/hostlaunchipnb/?state=ask_gdrive";
pub const FOLDER_HEADER: &str = "Select a folder to synchronize";

const GIT: Operation = Operation::post(ENDPOINT, "synchronizing repository")
    .inline()
    .with_policy(CodePolicy::WarnOnOne);
const STRICT: Operation = Operation::post(ENDPOINT, "synchronizing repository").inline();

/// Wording of one sync verb.
struct Messages {
    running: (AlertLevel, &'static str),
    done: &'static str,
    partial: &'static str,
    failed: &'static str,
    /// Whether the folder list changes and the embedded view is reloaded.
    reloads: bool,
}

const ADD: Messages = Messages {
    running: (AlertLevel::Info, "Adding repository..."),
    done: "Repository added successfully",
    partial: "Repository added successfully. \
              Pushing changes to remote repository not supported with HTTP URLs.",
    failed: "Error adding repository",
    reloads: true,
};

const SYNC: Messages = Messages {
    running: (AlertLevel::Info, "Synchronizing repository..."),
    done: "Repository synchronized successfully",
    partial: "Repository synchronized with some conflicts",
    failed: "Error synchronizing repository",
    reloads: false,
};

const DELETE: Messages = Messages {
    running: (AlertLevel::Warning, "Deleting repository..."),
    done: "Repository deleted successfully",
    partial: "Repository deleted successfully",
    failed: "Error deleting repository",
    reloads: true,
};

/// Location component of a picked `gdrive://name/id` path: the third
/// `/`-separated part when there are more than three, otherwise empty.
pub fn folder_location(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() > 3 {
        parts[2].to_string()
    } else {
        String::new()
    }
}

/// What [`FileSyncPlugin::register_folder_field`] bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderBinding {
    /// A picker opens for the field when the trigger is activated.
    Picker { field: String, trigger: String },
    /// No Drive token yet; the trigger should start authorization.
    NeedsAuthorization { trigger: String },
}

/// A folder chosen through the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSelection {
    pub path: String,
    pub loc: String,
}

pub struct FileSyncPlugin {
    ctx: Arc<ConsoleContext>,
    op: OpGuard,
}

impl FileSyncPlugin {
    pub fn new(ctx: Arc<ConsoleContext>) -> Self {
        Self {
            ctx,
            op: OpGuard::new("filesync"),
        }
    }

    pub fn guard(&self) -> &OpGuard {
        &self.op
    }

    /// Add a git repository checked out at `loc`. `None` when `repo` is
    /// blank and nothing was sent.
    pub async fn addgit(
        &self,
        repo: &str,
        loc: &str,
        branch: &str,
    ) -> ConsoleResult<Option<Outcome>> {
        let repo = repo.trim();
        if repo.is_empty() {
            return Ok(None);
        }
        let params = Params::new()
            .with("action", "addgit")
            .with("repo", repo)
            .with("loc", loc.trim())
            .with("branch", branch.trim());
        self.show_running(&ADD);
        self.send(&GIT, params, &ADD).await.map(Some)
    }

    pub async fn syncgit(&self, repo: &str) -> OpResult {
        let params = Params::new().with("action", "syncgit").with("repo", repo);
        self.show_running(&SYNC);
        self.send(&GIT, params, &SYNC).await
    }

    pub async fn delgit(&self, repo: &str) -> OpResult {
        let params = Params::new().with("action", "delgit").with("repo", repo);
        self.show_running(&DELETE);
        self.send(&STRICT, params, &DELETE).await
    }

    /// Add a Drive folder. `None` when `repo` is blank.
    pub async fn addgdrive(&self, repo: &str, loc: &str) -> ConsoleResult<Option<Outcome>> {
        let repo = repo.trim();
        if repo.is_empty() {
            return Ok(None);
        }
        let token = self.require_gauth().await?;
        let params = Params::new()
            .with("action", "addgdrive")
            .with("repo", repo)
            .with("loc", loc.trim())
            .with("gauth", token);
        self.show_running(&ADD);
        self.send(&STRICT, params, &ADD).await.map(Some)
    }

    pub async fn syncgdrive(&self, repo: &str) -> OpResult {
        let token = self.require_gauth().await?;
        let params = Params::new()
            .with("action", "syncgdrive")
            .with("repo", repo)
            .with("gauth", token);
        self.show_running(&SYNC);
        self.send(&STRICT, params, &SYNC).await
    }

    pub async fn delgdrive(&self, repo: &str) -> OpResult {
        let token = self.require_gauth().await?;
        let params = Params::new()
            .with("action", "delgdrive")
            .with("repo", repo)
            .with("gauth", token);
        self.show_running(&DELETE);
        self.send(&STRICT, params, &DELETE).await
    }

    pub async fn delgit_confirm(&self, repo: &str) -> ConsoleResult<Gated<Outcome>> {
        confirm_then_act(&self.op, self.ctx.ui(), DELETE_PROMPT, || self.delgit(repo))
            .await
            .transpose()
    }

    pub async fn delgdrive_confirm(&self, repo: &str) -> ConsoleResult<Gated<Outcome>> {
        confirm_then_act(&self.op, self.ctx.ui(), DELETE_PROMPT, || self.delgdrive(repo))
            .await
            .transpose()
    }

    /// The Drive token, or a prompt to go and get one. Affirming leaves
    /// for the authorization page; either way the action is not sent.
    pub async fn require_gauth(&self) -> ConsoleResult<String> {
        if let Some(token) = self.ctx.gauth_token() {
            return Ok(token);
        }
        let ui = self.ctx.ui();
        if ui.confirm(AUTHORIZE_PROMPT).await {
            tracing::info!("leaving for Google Drive authorization");
            ui.navigate(AUTHORIZE_LOCATION);
        }
        Err(ConsoleError::AuthorizationRequired {
            service: "Google Drive".to_string(),
        })
    }

    /// Bind a folder picker to `field`, opened by `trigger`. Without a
    /// Drive token only the authorization prompt can be bound.
    pub fn register_folder_field(
        &self,
        picker: &FolderPicker,
        field: &str,
        trigger: &str,
    ) -> FolderBinding {
        if self.ctx.gauth_token().is_none() {
            return FolderBinding::NeedsAuthorization {
                trigger: trigger.to_string(),
            };
        }
        picker.set(
            field,
            DialogOptions::new(FOLDER_HEADER)
                .with_filter(FOLDER_MIME)
                .with_trigger(trigger),
        );
        FolderBinding::Picker {
            field: field.to_string(),
            trigger: trigger.to_string(),
        }
    }

    /// Open the picker bound to `trigger` and derive the checkout location
    /// from the chosen folder.
    pub async fn pick_folder(
        &self,
        picker: &FolderPicker,
        trigger: &str,
    ) -> ConsoleResult<Option<FolderSelection>> {
        let picked = picker.trigger(trigger).await?;
        Ok(picked.map(|path| FolderSelection {
            loc: folder_location(&path),
            path,
        }))
    }

    fn show_running(&self, messages: &Messages) {
        let (level, text) = messages.running;
        self.ctx.ui().inpage_alert(level, text);
    }

    async fn send(&self, op: &Operation, params: Params, messages: &Messages) -> OpResult {
        let renderer = self.ctx.renderer();
        match op.run(&self.ctx, params).await {
            Ok(outcome) => {
                if messages.reloads {
                    self.ctx.ui().reload_view(SYNC_VIEW, ENDPOINT);
                }
                let (level, text) = match &outcome {
                    Outcome::Ok(_) => (AlertLevel::Success, messages.done),
                    Outcome::Warning(_) => (AlertLevel::Warning, messages.partial),
                    _ => (AlertLevel::Danger, messages.failed),
                };
                renderer.show(Feedback::Inline, level, text).await;
                Ok(outcome)
            }
            Err(err) => {
                tracing::warn!(error = %err, "sync request failed");
                renderer
                    .show(
                        Feedback::Inline,
                        AlertLevel::Danger,
                        &format!("{}.", messages.failed),
                    )
                    .await;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockPicker, MockResponse, RecordingSurface, UiEvent};
    use crate::plugins::testing::Harness;
    use serde_json::json;

    fn url() -> String {
        Harness::url(ENDPOINT)
    }

    #[test]
    fn test_folder_location() {
        assert_eq!(folder_location("gdrive://Notebooks/0B1x"), "Notebooks");
        assert_eq!(folder_location("gdrive://Notebooks"), "");
        assert_eq!(folder_location(""), "");
    }

    #[tokio::test]
    async fn test_addgit_codes() {
        let harness = Harness::new();
        for code in [0, 1, 2] {
            harness
                .http
                .push_response(&url(), MockResponse::envelope(code, json!(null)));
        }
        harness.http.push_response(&url(), MockResponse::status(500));
        let plugin = FileSyncPlugin::new(harness.ctx.clone());

        let ok = plugin.addgit(" https://github.com/a/b.git ", "b", "master").await;
        assert!(ok.unwrap().unwrap().is_ok());
        let partial = plugin.addgit("https://github.com/a/b.git", "b", "").await;
        assert_eq!(partial.unwrap().unwrap().label(), "warning");
        assert!(plugin.addgit("x", "", "").await.unwrap().unwrap().is_error());
        assert!(plugin.addgit("x", "", "").await.is_err());

        let levels: Vec<(AlertLevel, String)> = harness.ui.inpage();
        assert_eq!(
            levels,
            vec![
                (AlertLevel::Info, "Adding repository...".to_string()),
                (AlertLevel::Success, "Repository added successfully".to_string()),
                (AlertLevel::Info, "Adding repository...".to_string()),
                (AlertLevel::Warning, ADD.partial.to_string()),
                (AlertLevel::Info, "Adding repository...".to_string()),
                (AlertLevel::Danger, "Error adding repository".to_string()),
                (AlertLevel::Info, "Adding repository...".to_string()),
                (AlertLevel::Danger, "Error adding repository.".to_string()),
            ]
        );

        let request = &harness.http.get_requests()[0];
        assert_eq!(request.param("repo").as_deref(), Some("https://github.com/a/b.git"));
        assert_eq!(request.param("branch").as_deref(), Some("master"));
    }

    #[tokio::test]
    async fn test_add_reloads_view_only_after_response() {
        let harness = Harness::new();
        harness.http.push_response(&url(), MockResponse::envelope(0, json!(null)));
        harness.http.push_response(&url(), MockResponse::status(500));
        let plugin = FileSyncPlugin::new(harness.ctx.clone());

        plugin.addgit("r", "", "").await.unwrap();
        let _ = plugin.addgit("r", "", "").await;

        let reloads: Vec<UiEvent> = harness
            .ui
            .events()
            .into_iter()
            .filter(|e| matches!(e, UiEvent::ReloadView { .. }))
            .collect();
        assert_eq!(
            reloads,
            vec![UiEvent::ReloadView {
                view: SYNC_VIEW.to_string(),
                src: ENDPOINT.to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_blank_repo_is_a_no_op() {
        let harness = Harness::new();
        let plugin = FileSyncPlugin::new(harness.ctx.clone());

        assert_eq!(plugin.addgit("   ", "x", "y").await.unwrap(), None);
        assert_eq!(plugin.addgdrive("", "x").await.unwrap(), None);
        assert!(harness.ui.events().is_empty());
        assert_eq!(harness.http.request_count(), 0);
    }

    #[tokio::test]
    async fn test_syncgit_conflicts_and_no_reload() {
        let harness = Harness::new();
        harness
            .http
            .set_response(&url(), MockResponse::envelope(1, json!(null)));
        let plugin = FileSyncPlugin::new(harness.ctx.clone());

        plugin.syncgit("repo").await.unwrap();
        assert_eq!(
            harness.ui.inpage().last().unwrap(),
            &(
                AlertLevel::Warning,
                "Repository synchronized with some conflicts".to_string()
            )
        );
        assert!(!harness
            .ui
            .events()
            .iter()
            .any(|e| matches!(e, UiEvent::ReloadView { .. })));
    }

    #[tokio::test]
    async fn test_delete_treats_one_as_failure() {
        let harness = Harness::new();
        harness
            .http
            .set_response(&url(), MockResponse::envelope(1, json!(null)));
        let plugin = FileSyncPlugin::new(harness.ctx.clone());

        assert!(plugin.delgit("repo").await.unwrap().is_error());
        assert_eq!(
            harness.ui.inpage(),
            vec![
                (AlertLevel::Warning, "Deleting repository...".to_string()),
                (AlertLevel::Danger, "Error deleting repository".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_gdrive_without_token_prompts_and_navigates() {
        let harness = Harness::new();
        let plugin = FileSyncPlugin::new(harness.ctx.clone());

        let err = plugin.syncgdrive("gdrive://a/1").await.unwrap_err();
        assert_eq!(err.error_code(), "E_AUTH_REQUIRED");
        assert_eq!(harness.ui.confirms(), vec![AUTHORIZE_PROMPT]);
        assert_eq!(harness.ui.navigations(), vec![AUTHORIZE_LOCATION]);
        assert!(harness.ui.inpage().is_empty());
        assert_eq!(harness.http.request_count(), 0);
    }

    #[tokio::test]
    async fn test_gdrive_declined_authorization_stays() {
        let harness = Harness::with_surface(RecordingSurface::declining());
        let plugin = FileSyncPlugin::new(harness.ctx.clone());

        assert!(plugin.delgdrive("gdrive://a/1").await.is_err());
        assert!(harness.ui.navigations().is_empty());
    }

    #[tokio::test]
    async fn test_gdrive_sends_token_and_ignores_warning_code() {
        let harness = Harness::new();
        harness.ctx.set_gauth_token(Some("tok".to_string()));
        harness
            .http
            .set_response(&url(), MockResponse::envelope(1, json!(null)));
        let plugin = FileSyncPlugin::new(harness.ctx.clone());

        let outcome = plugin.addgdrive("gdrive://a/1", "a").await.unwrap().unwrap();
        assert!(outcome.is_error());

        let request = &harness.http.get_requests()[0];
        assert_eq!(request.param("action").as_deref(), Some("addgdrive"));
        assert_eq!(request.param("gauth").as_deref(), Some("tok"));
        assert_eq!(request.param("loc").as_deref(), Some("a"));
        assert!(harness.ui.confirms().is_empty());
    }

    #[tokio::test]
    async fn test_confirmed_delete() {
        let harness = Harness::new();
        harness
            .http
            .set_response(&url(), MockResponse::envelope(0, json!(null)));
        harness.ui.push_answers(&[false]);
        let plugin = FileSyncPlugin::new(harness.ctx.clone());

        assert_eq!(plugin.delgit_confirm("r").await.unwrap(), Gated::Declined);
        assert!(plugin.delgit_confirm("r").await.unwrap().is_done());
        assert_eq!(harness.ui.confirms(), vec![DELETE_PROMPT, DELETE_PROMPT]);
        assert_eq!(harness.http.request_count(), 1);
    }

    #[tokio::test]
    async fn test_folder_field_binding() {
        let harness = Harness::new();
        let plugin = FileSyncPlugin::new(harness.ctx.clone());
        let backend = MockPicker::new().with_pick("Notebooks", "0B1x");
        let picker = FolderPicker::new(Arc::new(backend.clone()), Default::default());

        assert_eq!(
            plugin.register_folder_field(&picker, "repo", "browse"),
            FolderBinding::NeedsAuthorization {
                trigger: "browse".to_string()
            }
        );

        harness.ctx.set_gauth_token(Some("tok".to_string()));
        assert!(matches!(
            plugin.register_folder_field(&picker, "repo", "browse"),
            FolderBinding::Picker { .. }
        ));

        let selection = plugin.pick_folder(&picker, "browse").await.unwrap().unwrap();
        assert_eq!(
            selection,
            FolderSelection {
                path: "gdrive://Notebooks/0B1x".to_string(),
                loc: "Notebooks".to_string(),
            }
        );
        let request = backend.requests().pop().unwrap();
        assert_eq!(request.title, FOLDER_HEADER);
        assert_eq!(request.mime_types.as_deref(), Some(FOLDER_MIME));
        assert!(request.select_folders);
    }
}
