//! Unified error type for the console.

use std::fmt;

use super::api::ApiError;
use super::category::ErrorCategory;
use super::context::ErrorContext;
use super::network::NetworkError;
use super::system::SystemError;
use super::validation::ValidationError;

/// Unified error type for console operations.
#[derive(Debug)]
pub enum ConsoleError {
    /// Transport tier: the request did not produce an envelope.
    Network(NetworkError),

    /// Application tier: the envelope code meant failure.
    Api(ApiError),

    /// Input rejected locally.
    Validation(ValidationError),

    /// A third-party authorization is missing (e.g. the Drive token).
    AuthorizationRequired { service: String },

    /// Local filesystem / environment problems.
    System(SystemError),

    /// Wrapped error with additional context.
    WithContext {
        error: Box<ConsoleError>,
        context: ErrorContext,
    },
}

impl ConsoleError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConsoleError::Network(err) if err.is_server_side() => ErrorCategory::Server,
            ConsoleError::Network(_) => ErrorCategory::Network,
            ConsoleError::Api(_) => ErrorCategory::Application,
            ConsoleError::Validation(_) => ErrorCategory::Validation,
            ConsoleError::AuthorizationRequired { .. } => ErrorCategory::User,
            ConsoleError::System(SystemError::EnvironmentError { .. }) => {
                ErrorCategory::Configuration
            }
            ConsoleError::System(_) => ErrorCategory::System,
            ConsoleError::WithContext { error, .. } => error.category(),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Network(err) => err.user_message(),
            ConsoleError::Api(err) => err.user_message(),
            ConsoleError::Validation(err) => err.to_string(),
            ConsoleError::AuthorizationRequired { service } => {
                format!("You must authorize access to {} first.", service)
            }
            ConsoleError::System(err) => err.user_message(),
            ConsoleError::WithContext { error, .. } => error.user_message(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConsoleError::Network(err) => err.error_code(),
            ConsoleError::Api(err) => err.error_code(),
            ConsoleError::Validation(err) => err.error_code(),
            ConsoleError::AuthorizationRequired { .. } => "E_AUTH_REQUIRED",
            ConsoleError::System(err) => err.error_code(),
            ConsoleError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        ConsoleError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            ConsoleError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the inner error without context.
    pub fn inner(&self) -> &ConsoleError {
        match self {
            ConsoleError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }

    /// True when the request never produced an envelope.
    pub fn is_transport(&self) -> bool {
        matches!(self.inner(), ConsoleError::Network(_))
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::Network(err) => write!(f, "{}", err),
            ConsoleError::Api(err) => write!(f, "{}", err),
            ConsoleError::Validation(err) => write!(f, "{}", err),
            ConsoleError::AuthorizationRequired { service } => {
                write!(f, "authorization required for {}", service)
            }
            ConsoleError::System(err) => write!(f, "{}", err),
            ConsoleError::WithContext { error, context } => write!(f, "{} ({})", error, context),
        }
    }
}

impl std::error::Error for ConsoleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConsoleError::Network(err) => Some(err),
            ConsoleError::Api(err) => Some(err),
            ConsoleError::Validation(err) => Some(err),
            ConsoleError::AuthorizationRequired { .. } => None,
            ConsoleError::System(err) => Some(err),
            ConsoleError::WithContext { error, .. } => error.source(),
        }
    }
}

impl From<NetworkError> for ConsoleError {
    fn from(err: NetworkError) -> Self {
        ConsoleError::Network(err)
    }
}

impl From<ApiError> for ConsoleError {
    fn from(err: ApiError) -> Self {
        ConsoleError::Api(err)
    }
}

impl From<ValidationError> for ConsoleError {
    fn from(err: ValidationError) -> Self {
        ConsoleError::Validation(err)
    }
}

impl From<SystemError> for ConsoleError {
    fn from(err: SystemError) -> Self {
        ConsoleError::System(err)
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(err: std::io::Error) -> Self {
        use super::system::classify_io_error;
        ConsoleError::System(classify_io_error(err, None, "I/O operation"))
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        ConsoleError::Network(NetworkError::InvalidResponse {
            message: err.to_string(),
        })
    }
}
