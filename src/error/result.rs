//! Result type alias for console operations.

use super::console_error::ConsoleError;

/// Type alias for Results using ConsoleError.
pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Extension trait for Result types to add context to errors.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    fn context(self, ctx: super::context::ErrorContext) -> ConsoleResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> ConsoleResult<T>
    where
        F: FnOnce() -> super::context::ErrorContext;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<ConsoleError>,
{
    fn context(self, ctx: super::context::ErrorContext) -> ConsoleResult<T> {
        self.map_err(|e| e.into().with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> ConsoleResult<T>
    where
        F: FnOnce() -> super::context::ErrorContext,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorContext, NetworkError};

    #[test]
    fn test_context_only_on_error() {
        let ok: Result<u8, NetworkError> = Ok(1);
        let mut called = false;
        let out = ok.with_context(|| {
            called = true;
            ErrorContext::new("never")
        });
        assert_eq!(out.ok(), Some(1));
        assert!(!called);

        let err: Result<u8, NetworkError> = Err(NetworkError::Cancelled);
        let out = err.context(ErrorContext::new("sync"));
        assert_eq!(
            out.unwrap_err().context().map(|c| c.operation.clone()),
            Some("sync".to_string())
        );
    }
}
