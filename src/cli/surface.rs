//! Terminal implementation of [`UiSurface`].

use async_trait::async_trait;
use clap::ValueEnum;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::output::{self, icons};
use crate::render::{dialog_html, dialog_text};
use crate::traits::{AlertLevel, DialogContent, UiSurface};

/// How dialogs are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned plain text
    #[default]
    Text,
    /// HTML tables, as the web console shows them
    Html,
}

/// Dialog as printed by the terminal surface.
pub fn render_dialog(format: OutputFormat, title: &str, content: &DialogContent) -> String {
    let body = match format {
        OutputFormat::Text => dialog_text(content),
        OutputFormat::Html => dialog_html(content),
    };
    format!(
        "{}\n{}\n{}",
        output::header(title),
        body.trim_end(),
        output::footer()
    )
}

/// `y` or `yes`, case-insensitive. Anything else declines.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[derive(Debug, Clone)]
pub struct TerminalSurface {
    base_url: String,
    format: OutputFormat,
    assume_yes: bool,
}

impl TerminalSurface {
    pub fn new(base_url: impl Into<String>, format: OutputFormat, assume_yes: bool) -> Self {
        Self {
            base_url: base_url.into(),
            format,
            assume_yes,
        }
    }

    fn location(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    async fn read_answer(&self, message: &str) -> std::io::Result<bool> {
        let mut stderr = tokio::io::stderr();
        stderr
            .write_all(format!("{} [y/N] ", message).as_bytes())
            .await?;
        stderr.flush().await?;

        let mut line = String::new();
        let read = BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        Ok(read > 0 && is_affirmative(&line))
    }
}

#[async_trait]
impl UiSurface for TerminalSurface {
    async fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            eprintln!("{} [y/N] y", message);
            return true;
        }
        match self.read_answer(message).await {
            Ok(answer) => answer,
            Err(err) => {
                tracing::warn!("Failed to read confirmation: {}", err);
                false
            }
        }
    }

    async fn alert(&self, message: &str) {
        println!("{}", message);
    }

    fn inpage_alert(&self, level: AlertLevel, message: &str) {
        output::print_status(output::level_icon(level), message);
    }

    async fn dialog(&self, title: &str, content: &DialogContent) {
        println!("{}", render_dialog(self.format, title, content));
    }

    fn navigate(&self, location: &str) {
        output::print_status(
            icons::NAVIGATE,
            &format!("Continue at {}", self.location(location)),
        );
    }

    fn reload_view(&self, view: &str, src: &str) {
        tracing::debug!(view, src, "view reload requested");
    }
}
