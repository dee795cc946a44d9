//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - transport used by the command channel
//! - [`UiSurface`] - alerts, prompts, dialogs and navigation

pub mod http;
pub mod ui;

pub use http::{Headers, HttpClient, HttpError, Response};
pub use ui::{AlertLevel, DialogContent, UiSurface};
