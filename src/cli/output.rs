//! Line-based terminal output for the console commands.
//!
//! Results go to stdout; prompts, the busy spinner and error lines go to
//! stderr so that dialog output can be piped.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::ConsoleError;
use crate::traits::AlertLevel;

/// Line width for separators.
const LINE_WIDTH: usize = 60;

/// Status icons
pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const FAILURE: &str = "✗";
    pub const WARNING: &str = "⚠";
    pub const INFO: &str = "•";
    pub const NAVIGATE: &str = "→";
}

/// Spinner characters for the busy indicator.
pub const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

const SPINNER_PERIOD: Duration = Duration::from_millis(80);

pub fn level_icon(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Success => icons::SUCCESS,
        AlertLevel::Info => icons::INFO,
        AlertLevel::Warning => icons::WARNING,
        AlertLevel::Danger => icons::FAILURE,
    }
}

/// Dialog title followed by a rule.
///
/// ```text
/// Statistics
/// ════════════════════════════════════════════════════════════
/// ```
pub fn header(title: &str) -> String {
    if title.is_empty() {
        return "═".repeat(LINE_WIDTH);
    }
    format!("{}\n{}", title, "═".repeat(LINE_WIDTH))
}

/// Closing rule under a dialog body.
pub fn footer() -> String {
    "─".repeat(LINE_WIDTH)
}

/// `  ✓ message`
pub fn status_line(icon: &str, message: &str) -> String {
    format!("  {} {}", icon, message)
}

pub fn print_status(icon: &str, message: &str) {
    println!("{}", status_line(icon, message));
}

/// Error line with its code, on stderr.
pub fn print_error(err: &ConsoleError) {
    eprintln!("{} [{}] {}", icons::FAILURE, err.error_code(), err.user_message());
}

fn clear_spinner() {
    let mut stderr = io::stderr();
    let _ = write!(stderr, "\r{}\r", " ".repeat(LINE_WIDTH));
    let _ = stderr.flush();
}

/// Draw a spinner on stderr while the activity count is above zero.
///
/// Returns `None` when stderr is not a terminal.
pub fn spawn_spinner(
    mut activity: watch::Receiver<usize>,
    message: &'static str,
) -> Option<JoinHandle<()>> {
    if !io::stderr().is_terminal() {
        return None;
    }
    Some(tokio::spawn(async move {
        let mut frame = 0usize;
        loop {
            if *activity.borrow_and_update() == 0 {
                clear_spinner();
                if activity.changed().await.is_err() {
                    return;
                }
                continue;
            }
            let mut stderr = io::stderr();
            let spinner = SPINNER_CHARS[frame % SPINNER_CHARS.len()];
            let _ = write!(stderr, "\r  {} {}", spinner, message);
            let _ = stderr.flush();
            frame += 1;
            tokio::select! {
                changed = activity.changed() => {
                    if changed.is_err() {
                        clear_spinner();
                        return;
                    }
                }
                _ = tokio::time::sleep(SPINNER_PERIOD) => {}
            }
        }
    }))
}
