//! Shared fixtures for integration tests.
//!
//! Every test talks to a `wiremock` server through the real reqwest
//! transport and records what the user would have seen.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::{MockServer, ResponseTemplate};

use jboxctl::adapters::{RecordingSurface, ReqwestHttpClient};
use jboxctl::config::ConsoleConfig;
use jboxctl::context::ConsoleContext;

/// A console wired to a mock backend.
pub struct Console {
    pub server: MockServer,
    pub ctx: Arc<ConsoleContext>,
    pub ui: RecordingSurface,
}

impl Console {
    pub async fn start() -> Self {
        Self::start_with(|config| config).await
    }

    /// Start with a tweaked configuration. Cookies stay in memory unless
    /// the closure sets a path.
    pub async fn start_with(tweak: impl FnOnce(ConsoleConfig) -> ConsoleConfig) -> Self {
        let server = MockServer::start().await;
        let config = tweak(
            ConsoleConfig::default()
                .with_base_url(server.uri())
                .with_cookie_path(None)
                .with_request_timeout(Duration::from_secs(5)),
        );
        let ui = RecordingSurface::new();
        let ctx = ConsoleContext::from_config(
            config,
            Arc::new(ReqwestHttpClient::new()),
            Arc::new(ui.clone()),
        )
        .expect("context builds");
        Self { server, ctx, ui }
    }

    /// Form-decoded body of the `index`th request the server received.
    pub async fn form(&self, index: usize) -> Vec<(String, String)> {
        let requests = self.server.received_requests().await.unwrap_or_default();
        let body = String::from_utf8_lossy(&requests[index].body).to_string();
        decode_pairs(&body)
    }

    /// Query pairs of the `index`th request the server received.
    pub async fn query(&self, index: usize) -> Vec<(String, String)> {
        let requests = self.server.received_requests().await.unwrap_or_default();
        requests[index]
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}

/// Cookie jar file inside `dir`.
pub fn jar_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("cookies.json")
}

pub fn decode_pairs(body: &str) -> Vec<(String, String)> {
    let decode = |s: &str| {
        let spaced = s.replace('+', " ");
        urlencoding::decode(&spaced)
            .map(|c| c.into_owned())
            .unwrap_or(spaced)
    };
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(k), decode(v))
        })
        .collect()
}

pub fn param<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// `{"code": code, "data": data}` with status 200.
pub fn envelope(code: i64, data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "code": code, "data": data }))
}
