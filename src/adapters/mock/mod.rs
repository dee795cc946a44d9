//! Mock implementations for testing.
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses
//! - [`RecordingSurface`] - UI surface with scripted prompt answers
//! - [`MockPicker`] - folder picker backend with a scripted selection

pub mod http;
pub mod picker;
pub mod ui;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use picker::MockPicker;
pub use ui::{RecordingSurface, UiEvent};
