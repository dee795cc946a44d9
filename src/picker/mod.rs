//! Folder picker over a third-party file-selection widget.
//!
//! The widget itself sits behind [`PickerBackend`]. [`FolderPicker`] owns
//! what surrounds it: bootstrapping the widget libraries, authorizing once
//! and caching the token and user, per-field dialog options, and writing
//! the chosen folder back as a `gdrive://name/id` path.
//!
//! Once a token and user are cached they are reused without checking
//! whether the token has expired.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::ConsoleResult;

pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
pub const DEFAULT_SCOPE: &str =
    "https://www.googleapis.com/auth/userinfo.email https://www.googleapis.com/auth/drive";

/// Widget library loaded before first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Library {
    Auth,
    Picker,
}

impl Library {
    pub const ALL: [Library; 2] = [Library::Auth, Library::Picker];

    /// Bit in the init stage mask.
    pub fn bit(self) -> u8 {
        match self {
            Library::Auth => 1,
            Library::Picker => 2,
        }
    }
}

const FULLY_LOADED: u8 = 3;

/// How the dialog for one field is presented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogOptions {
    /// Element that opens the dialog; the field itself when `None`.
    pub trigger: Option<String>,
    pub header: String,
    /// Mime type filter; empty for none.
    pub filter: String,
}

impl DialogOptions {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            ..Self::default()
        }
    }

    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }
}

/// Widget application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerSettings {
    pub app_id: String,
    pub dev_key: String,
    pub scope: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PickerSettings {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            dev_key: String::new(),
            scope: DEFAULT_SCOPE.to_string(),
            width: 800,
            height: 400,
        }
    }
}

/// Everything the backend needs to open one dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerRequest {
    pub title: String,
    pub token: String,
    pub auth_user: Option<String>,
    pub app_id: String,
    pub dev_key: String,
    pub width: u32,
    pub height: u32,
    pub nav_hidden: bool,
    pub multiselect: bool,
    pub select_folders: bool,
    pub mime_types: Option<String>,
}

/// A document the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedDocument {
    pub id: String,
    pub name: String,
}

impl PickedDocument {
    pub fn path(&self) -> String {
        format!("gdrive://{}/{}", self.name, self.id)
    }
}

/// The third-party widget.
#[async_trait]
pub trait PickerBackend: Send + Sync {
    async fn load(&self, library: Library) -> ConsoleResult<()>;

    /// Ask the user for consent; resolves to an access token.
    async fn authorize(&self, app_id: &str, scope: &str) -> ConsoleResult<String>;

    /// Identity of the authorized user.
    async fn user_email(&self, token: &str) -> ConsoleResult<String>;

    /// Show the dialog. `None` if the user cancelled.
    async fn pick(&self, request: &PickerRequest) -> ConsoleResult<Option<PickedDocument>>;

    /// Close an open dialog.
    fn close(&self);
}

#[derive(Debug, Default)]
struct PickerState {
    init_stage: u8,
    token: Option<String>,
    user: Option<String>,
    dialogs: HashMap<String, DialogOptions>,
    values: HashMap<String, String>,
    visible: bool,
}

pub struct FolderPicker {
    backend: Arc<dyn PickerBackend>,
    settings: PickerSettings,
    state: Mutex<PickerState>,
}

impl FolderPicker {
    pub fn new(backend: Arc<dyn PickerBackend>, settings: PickerSettings) -> Self {
        Self {
            backend,
            settings,
            state: Mutex::new(PickerState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, PickerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn init_stage(&self) -> u8 {
        self.state().init_stage
    }

    /// Load whichever widget libraries are still missing.
    pub async fn init(&self) -> ConsoleResult<()> {
        for library in Library::ALL {
            let stage = self.state().init_stage;
            if stage & FULLY_LOADED == FULLY_LOADED {
                break;
            }
            if stage & library.bit() == 0 {
                self.backend.load(library).await?;
                self.state().init_stage |= library.bit();
                tracing::debug!(?library, "picker library loaded");
            }
        }
        Ok(())
    }

    /// Authorize unless a token and user are already cached.
    pub async fn authorize(&self) -> ConsoleResult<()> {
        self.init().await?;
        {
            let state = self.state();
            if state.token.is_some() && state.user.is_some() {
                return Ok(());
            }
        }
        let token = self
            .backend
            .authorize(&self.settings.app_id, &self.settings.scope)
            .await?;
        self.state().token = Some(token.clone());
        let user = self.backend.user_email(&token).await?;
        tracing::info!(user = %user, "picker authorized");
        self.state().user = Some(user);
        Ok(())
    }

    /// Register dialog options for `field`. Earlier options are replaced.
    pub fn set(&self, field: &str, options: DialogOptions) {
        self.state().dialogs.insert(field.to_string(), options);
    }

    pub fn options(&self, field: &str) -> Option<DialogOptions> {
        self.state().dialogs.get(field).cloned()
    }

    /// Current value of `field`.
    pub fn value(&self, field: &str) -> Option<String> {
        self.state().values.get(field).cloned()
    }

    pub fn is_visible(&self) -> bool {
        self.state().visible
    }

    /// Open the dialog of whichever field `element` triggers. `None` if no
    /// field is bound to it or nothing was picked.
    pub async fn trigger(&self, element: &str) -> ConsoleResult<Option<String>> {
        let field = {
            let state = self.state();
            state
                .dialogs
                .iter()
                .find(|(field, options)| {
                    options.trigger.as_deref().unwrap_or(field.as_str()) == element
                })
                .map(|(field, _)| field.clone())
        };
        match field {
            Some(field) => self.show(&field).await,
            None => {
                tracing::debug!(element, "no picker bound to trigger");
                Ok(None)
            }
        }
    }

    /// Authorize if needed, clear `field` and open its dialog. The picked
    /// folder's path is written to the field and returned.
    pub async fn show(&self, field: &str) -> ConsoleResult<Option<String>> {
        self.authorize().await?;
        let request = {
            let mut state = self.state();
            state.values.remove(field);
            let options = state.dialogs.get(field).cloned().unwrap_or_default();
            state.visible = true;
            self.request(&state, &options)
        };

        let picked = self.backend.pick(&request).await;

        let mut state = self.state();
        state.visible = false;
        let path = picked?.map(|doc| doc.path());
        if let Some(path) = &path {
            state.values.insert(field.to_string(), path.clone());
        }
        Ok(path)
    }

    /// Close the dialog if one is open.
    pub fn hide(&self) {
        let mut state = self.state();
        if state.visible {
            self.backend.close();
            state.visible = false;
        }
    }

    pub fn token(&self) -> Option<String> {
        self.state().token.clone()
    }

    pub fn user(&self) -> Option<String> {
        self.state().user.clone()
    }

    /// Authorize if needed and hand back `(user, token)`.
    pub async fn set_auth(&self) -> ConsoleResult<(String, String)> {
        self.authorize().await?;
        let state = self.state();
        Ok((
            state.user.clone().unwrap_or_default(),
            state.token.clone().unwrap_or_default(),
        ))
    }

    fn request(&self, state: &PickerState, options: &DialogOptions) -> PickerRequest {
        let folders = options.filter == FOLDER_MIME;
        PickerRequest {
            title: options.header.clone(),
            token: state.token.clone().unwrap_or_default(),
            auth_user: state.user.clone(),
            app_id: self.settings.app_id.clone(),
            dev_key: self.settings.dev_key.clone(),
            width: self.settings.width,
            height: self.settings.height,
            nav_hidden: true,
            multiselect: false,
            select_folders: folders,
            mime_types: folders.then(|| FOLDER_MIME.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockPicker;

    fn picker(backend: &MockPicker) -> FolderPicker {
        FolderPicker::new(Arc::new(backend.clone()), PickerSettings::default())
    }

    #[test]
    fn test_picked_path() {
        let doc = PickedDocument {
            id: "0B1x".to_string(),
            name: "Notebooks".to_string(),
        };
        assert_eq!(doc.path(), "gdrive://Notebooks/0B1x");
    }

    #[tokio::test]
    async fn test_init_loads_each_library_once() {
        let backend = MockPicker::new();
        let picker = picker(&backend);

        picker.init().await.unwrap();
        picker.init().await.unwrap();
        assert_eq!(picker.init_stage(), 3);
        assert_eq!(backend.loads(), vec![Library::Auth, Library::Picker]);
    }

    #[tokio::test]
    async fn test_authorization_is_cached() {
        let backend = MockPicker::new().with_auth("tok", "a@b.org");
        let picker = picker(&backend);

        let (user, token) = picker.set_auth().await.unwrap();
        assert_eq!((user.as_str(), token.as_str()), ("a@b.org", "tok"));
        picker.authorize().await.unwrap();
        assert_eq!(backend.authorize_count(), 1);
        assert_eq!(picker.token().as_deref(), Some("tok"));
        assert_eq!(picker.user().as_deref(), Some("a@b.org"));
    }

    #[tokio::test]
    async fn test_failed_authorization_keeps_nothing() {
        let backend = MockPicker::new().failing_auth();
        let picker = picker(&backend);

        assert!(picker.show("repo").await.is_err());
        assert!(picker.token().is_none());
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_show_builds_request_and_writes_path() {
        let backend = MockPicker::new()
            .with_auth("tok", "a@b.org")
            .with_pick("Notebooks", "0B1x");
        let picker = picker(&backend);
        picker.set(
            "repo",
            DialogOptions::new("Select a folder").with_filter(FOLDER_MIME),
        );

        let path = picker.show("repo").await.unwrap();
        assert_eq!(path.as_deref(), Some("gdrive://Notebooks/0B1x"));
        assert_eq!(picker.value("repo"), path);
        assert!(!picker.is_visible());

        let request = &backend.requests()[0];
        assert_eq!(request.title, "Select a folder");
        assert_eq!(request.token, "tok");
        assert_eq!(request.auth_user.as_deref(), Some("a@b.org"));
        assert!(request.nav_hidden);
        assert!(!request.multiselect);
        assert!(request.select_folders);
        assert_eq!((request.width, request.height), (800, 400));
    }

    #[tokio::test]
    async fn test_cancelled_pick_clears_field() {
        let backend = MockPicker::new().with_pick("A", "1");
        let picker = picker(&backend);
        picker.set("repo", DialogOptions::new("x"));

        picker.show("repo").await.unwrap();
        backend.cancel_next();
        assert_eq!(picker.show("repo").await.unwrap(), None);
        assert_eq!(picker.value("repo"), None);
        assert!(!backend.requests()[1].select_folders);
        assert_eq!(backend.requests()[1].mime_types, None);
    }

    #[tokio::test]
    async fn test_trigger_resolves_bound_field() {
        let backend = MockPicker::new().with_pick("A", "1");
        let picker = picker(&backend);
        picker.set("repo", DialogOptions::new("x").with_trigger("browse"));
        picker.set("other", DialogOptions::new("y"));

        assert_eq!(
            picker.trigger("browse").await.unwrap().as_deref(),
            Some("gdrive://A/1")
        );
        assert!(picker.value("repo").is_some());
        assert!(picker.trigger("other").await.unwrap().is_some());
        assert_eq!(picker.trigger("nothing").await.unwrap(), None);
        assert_eq!(backend.requests().len(), 2);
    }

    #[test]
    fn test_hide_only_closes_open_dialog() {
        let backend = MockPicker::new();
        let picker = picker(&backend);
        picker.hide();
        assert_eq!(backend.close_count(), 0);

        picker.state().visible = true;
        picker.hide();
        assert_eq!(backend.close_count(), 1);
        assert!(!picker.is_visible());
    }
}
