//! User-facing surface abstraction.
//!
//! Plugins never print or draw. They hand modal alerts, yes/no prompts,
//! in-page status lines, dialogs and navigation requests to a
//! [`UiSurface`]; the terminal front end and the recording test double
//! both implement it.

use async_trait::async_trait;
use serde_json::Value;

/// Severity of an in-page alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Success => "success",
            AlertLevel::Info => "info",
            AlertLevel::Warning => "warning",
            AlertLevel::Danger => "danger",
        }
    }

    /// CSS class used by the HTML alert region.
    pub fn css_class(&self) -> String {
        format!("alert-{}", self.as_str())
    }
}

/// Body of a modal dialog. The surface picks the presentation.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogContent {
    /// Arbitrary JSON rendered as nested tables.
    Table(Value),
    /// A headed grid with fixed columns.
    Grid {
        heading: String,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Verbatim text, shown monospaced.
    Preformatted(String),
}

/// Everything a feature plugin may do to the user.
#[async_trait]
pub trait UiSurface: Send + Sync {
    /// Modal yes/no prompt. Resolves once the user answers.
    async fn confirm(&self, message: &str) -> bool;

    /// Modal message. Resolves once the user dismisses it.
    async fn alert(&self, message: &str);

    /// Non-modal status line. Ignored if the surface has no alert region.
    fn inpage_alert(&self, level: AlertLevel, message: &str);

    /// Hide the in-page alert region.
    fn hide_inpage_alert(&self) {}

    /// Modal dialog with a title.
    async fn dialog(&self, title: &str, content: &DialogContent);

    /// Leave the current page for `location` (a path on the backend).
    fn navigate(&self, location: &str);

    /// Point an embedded view at a new source.
    fn reload_view(&self, _view: &str, _src: &str) {}
}
