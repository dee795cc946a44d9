//! System-related error types.
//!
//! Local state lives in a couple of small JSON files (cookies, config);
//! these are the ways reading or writing them can go wrong.

use std::fmt;
use std::path::PathBuf;

/// System-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum SystemError {
    /// Could not determine home directory.
    NoHomeDirectory,

    /// Generic I/O error.
    IoError {
        operation: String,
        path: Option<PathBuf>,
        message: String,
    },

    /// A local file existed but did not parse.
    CorruptFile { path: PathBuf, message: String },

    /// Environment variable set to something unusable.
    EnvironmentError { variable: String, message: String },
}

impl SystemError {
    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            SystemError::NoHomeDirectory => {
                "Could not determine your home directory. Set HOME or pass --cookies.".to_string()
            }
            SystemError::IoError {
                operation,
                path: Some(path),
                message,
            } => format!("Failed to {} '{}': {}", operation, path.display(), message),
            SystemError::IoError {
                operation, message, ..
            } => format!("Failed to {}: {}", operation, message),
            SystemError::CorruptFile { path, .. } => {
                format!("'{}' is corrupt. Delete it and try again.", path.display())
            }
            SystemError::EnvironmentError { variable, message } => {
                format!("Invalid value for {}: {}", variable, message)
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            SystemError::NoHomeDirectory => "E_SYS_HOME",
            SystemError::IoError { .. } => "E_SYS_IO",
            SystemError::CorruptFile { .. } => "E_SYS_CORRUPT",
            SystemError::EnvironmentError { .. } => "E_SYS_ENV",
        }
    }
}

impl fmt::Display for SystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemError::NoHomeDirectory => write!(f, "home directory not found"),
            SystemError::IoError {
                operation,
                path,
                message,
            } => match path {
                Some(path) => write!(f, "{} '{}': {}", operation, path.display(), message),
                None => write!(f, "{}: {}", operation, message),
            },
            SystemError::CorruptFile { path, message } => {
                write!(f, "corrupt file '{}': {}", path.display(), message)
            }
            SystemError::EnvironmentError { variable, message } => {
                write!(f, "environment variable {}: {}", variable, message)
            }
        }
    }
}

impl std::error::Error for SystemError {}

/// Classify an I/O error with the operation and path it happened on.
pub fn classify_io_error(
    err: std::io::Error,
    path: Option<PathBuf>,
    operation: &str,
) -> SystemError {
    SystemError::IoError {
        operation: operation.to_string(),
        path,
        message: err.to_string(),
    }
}
