//! Turning envelopes and failures into user-visible effects.
//!
//! Plugins decide *what* to say; [`ResponseRenderer`] decides *how* it
//! reaches the [`UiSurface`]: a modal alert, an in-page status line or a
//! dialog. The fallback wording for failures is shared here so every
//! plugin words them the same way.

pub mod html;
pub mod invites;
pub mod text;

pub use html::{dialog_html, escape_html, grid_to_html, json_to_html_table};
pub use invites::invites_grid;
pub use text::{dialog_text, grid_to_text, json_to_text};

use crate::envelope::Outcome;
use crate::error::{ApiError, ConsoleError};
use crate::traits::{AlertLevel, DialogContent, UiSurface};

/// Where an operation reports its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// Modal alert.
    Popup,
    /// In-page status line.
    Inline,
}

/// Renders outcomes onto a surface.
#[derive(Clone, Copy)]
pub struct ResponseRenderer<'a> {
    ui: &'a dyn UiSurface,
}

impl<'a> ResponseRenderer<'a> {
    pub fn new(ui: &'a dyn UiSurface) -> Self {
        Self { ui }
    }

    pub fn ui(&self) -> &'a dyn UiSurface {
        self.ui
    }

    /// Show a message through the chosen channel.
    pub async fn show(&self, feedback: Feedback, level: AlertLevel, message: &str) {
        match feedback {
            Feedback::Popup => self.ui.alert(message).await,
            Feedback::Inline => self.ui.inpage_alert(level, message),
        }
    }

    /// "Error {action}. {reason}" or "Unknown error {action}."
    pub async fn failure(
        &self,
        feedback: Feedback,
        action: &str,
        code: i64,
        reason: Option<String>,
    ) {
        let message = ApiError::rejected(action, code, reason).user_message();
        self.show(feedback, AlertLevel::Danger, &message).await;
    }

    /// "Communication error while {action}."
    pub async fn comm_error(&self, feedback: Feedback, action: &str) {
        let message = format!("Communication error while {}.", action);
        self.show(feedback, AlertLevel::Danger, &message).await;
    }

    /// Render an error outcome with the shared wording.
    pub async fn outcome_failure(&self, feedback: Feedback, action: &str, outcome: &Outcome) {
        if let Outcome::Error(reason) = outcome {
            self.failure(feedback, action, -1, reason.clone()).await;
        }
    }

    /// Render any console error: transport failures get the communication
    /// error wording, everything else its own user message.
    pub async fn error(&self, feedback: Feedback, action: &str, err: &ConsoleError) {
        if err.is_transport() {
            self.comm_error(feedback, action).await;
        } else {
            self.show(feedback, AlertLevel::Danger, &err.user_message()).await;
        }
    }

    pub async fn table(&self, title: &str, data: serde_json::Value) {
        self.ui.dialog(title, &DialogContent::Table(data)).await;
    }

    pub async fn preformatted(&self, title: &str, text: impl Into<String>) {
        self.ui
            .dialog(title, &DialogContent::Preformatted(text.into()))
            .await;
    }

    pub async fn dialog(&self, title: &str, content: &DialogContent) {
        self.ui.dialog(title, content).await;
    }
}
