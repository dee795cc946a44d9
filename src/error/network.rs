//! Transport-tier error types.
//!
//! Anything that prevents a well-formed envelope from reaching the caller
//! lands here: connection failures, timeouts, cancellation, non-2xx
//! statuses and bodies that are not JSON.

use std::fmt;

use crate::traits::HttpError;

/// Network-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Connection to the server failed.
    ConnectionFailed { url: String, message: String },

    /// Request did not complete before its deadline.
    Timeout { endpoint: String, duration_ms: u64 },

    /// HTTP status error (non-2xx response).
    HttpStatus { status: u16, message: String },

    /// Body was not a valid envelope.
    InvalidResponse { message: String },

    /// Request was aborted by its caller.
    Cancelled,

    /// Generic network error.
    Other { message: String },
}

impl NetworkError {
    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { .. } => {
                "Unable to connect to the server. Please check your connection.".to_string()
            }
            NetworkError::Timeout { endpoint, duration_ms } => format!(
                "The request to {} timed out after {} ms. The server may be slow or unreachable.",
                endpoint, duration_ms
            ),
            NetworkError::HttpStatus { status, .. } => match *status {
                401 | 403 => "Access denied. Your session may have expired.".to_string(),
                404 => "The requested resource was not found.".to_string(),
                500..=599 => {
                    "The server is experiencing issues. Please try again later.".to_string()
                }
                _ => format!("The server returned an error (HTTP {}).", status),
            },
            NetworkError::InvalidResponse { .. } => {
                "Received an invalid response from the server.".to_string()
            }
            NetworkError::Cancelled => "The request was cancelled.".to_string(),
            NetworkError::Other { message } => format!("Network error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::InvalidResponse { .. } => "E_NET_INVALID",
            NetworkError::Cancelled => "E_NET_CANCEL",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }

    /// True for 5xx statuses.
    pub fn is_server_side(&self) -> bool {
        matches!(self, NetworkError::HttpStatus { status, .. } if *status >= 500)
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::ConnectionFailed { url, message } => {
                write!(f, "Connection failed to '{}': {}", url, message)
            }
            NetworkError::Timeout { endpoint, duration_ms } => {
                write!(f, "{} timed out after {} ms", endpoint, duration_ms)
            }
            NetworkError::HttpStatus { status, message } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            NetworkError::InvalidResponse { message } => write!(f, "Invalid response: {}", message),
            NetworkError::Cancelled => write!(f, "Request cancelled"),
            NetworkError::Other { message } => write!(f, "Network error: {}", message),
        }
    }
}

impl std::error::Error for NetworkError {}

/// Classify an adapter-level [`HttpError`] for the given URL.
pub fn classify_http_error(err: HttpError, url: &str) -> NetworkError {
    match err {
        HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed {
            url: url.to_string(),
            message,
        },
        HttpError::Timeout(message) => NetworkError::Other {
            message: format!("transport timeout: {}", message),
        },
        HttpError::ServerError { status, message } => NetworkError::HttpStatus { status, message },
        HttpError::Cancelled => NetworkError::Cancelled,
        HttpError::InvalidUrl(message) => NetworkError::ConnectionFailed {
            url: url.to_string(),
            message: format!("invalid URL: {}", message),
        },
        HttpError::Io(message) | HttpError::Other(message) => NetworkError::Other { message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_connection_failure_keeps_url() {
        let err = classify_http_error(
            HttpError::ConnectionFailed("refused".to_string()),
            "http://host/ping/",
        );
        assert_eq!(
            err,
            NetworkError::ConnectionFailed {
                url: "http://host/ping/".to_string(),
                message: "refused".to_string()
            }
        );
        assert_eq!(err.error_code(), "E_NET_CONN");
    }

    #[test]
    fn test_server_side_only_for_5xx() {
        let err = NetworkError::HttpStatus {
            status: 502,
            message: String::new(),
        };
        assert!(err.is_server_side());
        let err = NetworkError::HttpStatus {
            status: 403,
            message: String::new(),
        };
        assert!(!err.is_server_side());
        assert!(err.user_message().contains("Access denied"));
    }

    #[test]
    fn test_timeout_message_names_endpoint() {
        let err = NetworkError::Timeout {
            endpoint: "/jboxplugin/par/".to_string(),
            duration_ms: 1500,
        };
        assert!(err.user_message().contains("/jboxplugin/par/"));
        assert_eq!(err.to_string(), "/jboxplugin/par/ timed out after 1500 ms");
    }
}
