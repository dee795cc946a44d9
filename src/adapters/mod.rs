//! Concrete implementations of trait abstractions.
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`mock`] - test doubles for every trait in `crate::traits`

pub mod mock;
pub mod reqwest_http;

pub use mock::{MockHttpClient, RecordingSurface};
pub use reqwest_http::ReqwestHttpClient;
