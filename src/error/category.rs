//! Error category classification for unified error handling.
//!
//! Categories separate the two failure tiers the backend can produce
//! (transport and application) from local problems such as invalid input
//! or a missing home directory.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Transport failed: connection, timeout, non-2xx, undecodable body.
    Network,

    /// The backend answered 5xx.
    Server,

    /// The backend answered with a nonzero envelope code.
    Application,

    /// Input was rejected before anything was sent.
    Validation,

    /// The user has to act (authorize, confirm, log in again).
    User,

    /// Filesystem or OS errors.
    System,

    /// Missing or malformed settings.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if an identical request could succeed later.
    ///
    /// The console never retries on its own; this only drives the hint text.
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Application => "application",
            ErrorCategory::Validation => "validation",
            ErrorCategory::User => "user",
            ErrorCategory::System => "system",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check your connection to the server and try again",
            ErrorCategory::Server => {
                "The server may be experiencing issues. Please try again later"
            }
            ErrorCategory::Application => "The server refused the request. See the message above",
            ErrorCategory::Validation => "Please check your input and try again",
            ErrorCategory::User => "Complete the requested action and retry",
            ErrorCategory::System => "Check file permissions and available disk space",
            ErrorCategory::Configuration => "Check your configuration settings",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
