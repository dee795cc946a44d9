//! Unified error handling for the console.
//!
//! Failures come in the two tiers the backend defines, plus local ones:
//!
//! | Category | Source | Example |
//! |----------|--------|---------|
//! | Network | transport | connection refused, timeout, non-2xx, bad JSON |
//! | Server | transport | HTTP 5xx |
//! | Application | envelope | `{"code": -1, "data": "no such cluster"}` |
//! | Validation | local | API name with spaces |
//! | User | local | Google Drive not authorized yet |
//! | System | local | cookie jar unreadable |
//! | Configuration | local | bad `JBOX_TIMEOUT_SECS` |
//!
//! ```ignore
//! use jboxctl::error::{ConsoleResult, ErrorContext, ResultExt};
//!
//! fn load() -> ConsoleResult<String> {
//!     std::fs::read_to_string("cookies.json").context(ErrorContext::new("load cookies"))
//! }
//! ```

mod api;
mod category;
mod console_error;
mod context;
mod network;
mod result;
mod system;
mod validation;

pub use api::ApiError;
pub use category::ErrorCategory;
pub use console_error::ConsoleError;
pub use context::ErrorContext;
pub use network::{classify_http_error, NetworkError};
pub use result::{ConsoleResult, ResultExt};
pub use system::{classify_io_error, SystemError};
pub use validation::ValidationError;
