//! Application-tier errors.
//!
//! The transport succeeded and the body decoded, but the envelope carried a
//! code the endpoint's policy treats as failure.

use std::fmt;

/// Failure reported by the backend inside a well-formed envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Nonzero code with an optional server-supplied reason.
    Rejected {
        action: String,
        code: i64,
        message: Option<String>,
    },

    /// The backend answered success but the payload had the wrong shape.
    UnexpectedPayload { action: String, message: String },
}

impl ApiError {
    pub fn rejected(action: impl Into<String>, code: i64, message: Option<String>) -> Self {
        ApiError::Rejected {
            action: action.into(),
            code,
            message,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected {
                action,
                message: Some(message),
                ..
            } => format!("Error {}. {}", action, message),
            ApiError::Rejected { action, .. } => format!("Unknown error {}.", action),
            ApiError::UnexpectedPayload { action, .. } => {
                format!("Unexpected response while {}.", action)
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Rejected { .. } => "E_API_REJECTED",
            ApiError::UnexpectedPayload { .. } => "E_API_PAYLOAD",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Rejected {
                action,
                code,
                message,
            } => match message {
                Some(message) => write!(f, "{} rejected with code {}: {}", action, code, message),
                None => write!(f, "{} rejected with code {}", action, code),
            },
            ApiError::UnexpectedPayload { action, message } => {
                write!(f, "unexpected payload while {}: {}", action, message)
            }
        }
    }
}

impl std::error::Error for ApiError {}
