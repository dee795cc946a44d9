//! Input rejected before a request is issued.

use thiserror::Error;

/// Local validation failures. Display text is what the user sees.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid URL specified for the description link.")]
    InvalidUrl(String),

    #[error("Invalid API name specified.")]
    InvalidApiName(String),

    #[error("Command not specified.")]
    MissingCommand,

    #[error("Invalid number of instances: {0}.")]
    InvalidInstanceCount(i64),

    #[error("Invalid spot price: {0}.")]
    InvalidSpotPrice(f64),

    #[error("{0} must not be empty.")]
    Empty(&'static str),
}

impl ValidationError {
    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::InvalidUrl(_) => "E_VAL_URL",
            ValidationError::InvalidApiName(_) => "E_VAL_NAME",
            ValidationError::MissingCommand => "E_VAL_CMD",
            ValidationError::InvalidInstanceCount(_) => "E_VAL_COUNT",
            ValidationError::InvalidSpotPrice(_) => "E_VAL_PRICE",
            ValidationError::Empty(_) => "E_VAL_EMPTY",
        }
    }
}
