//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that can return predefined
//! envelopes, transport errors, delayed responses or responses that never
//! arrive.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::traits::{Headers, HttpClient, HttpError, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method (GET or POST)
    pub method: String,
    /// Request URL, query string included
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body (for POST requests)
    pub body: Option<String>,
}

impl RecordedRequest {
    /// Decoded `key=value` pairs from the query string (GET) or body (POST).
    pub fn params(&self) -> Vec<(String, String)> {
        let raw = match &self.body {
            Some(body) => body.as_str(),
            None => self.url.split_once('?').map(|(_, q)| q).unwrap_or(""),
        };
        raw.split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(key), decode(value))
            })
            .collect()
    }

    /// Value of a single decoded parameter.
    pub fn param(&self, key: &str) -> Option<String> {
        self.params()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a response
    Success(Response),
    /// Return a transport error
    Error(HttpError),
    /// Return a response after a delay
    Delayed(Duration, Response),
    /// Never complete
    Pending,
}

impl MockResponse {
    /// A 200 response carrying a `{code, data}` envelope.
    pub fn envelope(code: i64, data: serde_json::Value) -> Self {
        let body = serde_json::json!({ "code": code, "data": data }).to_string();
        MockResponse::Success(Response::new(200, Bytes::from(body)))
    }

    /// A response with the given status and empty body.
    pub fn status(status: u16) -> Self {
        MockResponse::Success(Response::new(status, Bytes::new()))
    }

    /// A 200 response with a raw body.
    pub fn raw(body: &'static str) -> Self {
        MockResponse::Success(Response::new(200, Bytes::from(body)))
    }
}

/// Mock HTTP client for testing.
///
/// Lookup order for a request URL: the queue of one-shot responses pushed
/// for the longest matching prefix, the persistent response for the longest
/// matching prefix, then the default response.
///
/// ```ignore
/// let client = MockHttpClient::new();
/// client.set_response("http://mock/ping/", MockResponse::status(204));
/// client.push_response("http://mock/ping/", MockResponse::status(500));
/// // first ping fails, every later ping succeeds
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    queued: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    default_response: Arc<Mutex<Option<MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn longest_prefix<'a, V>(map: &'a HashMap<String, V>, url: &str) -> Option<&'a String> {
    map.keys()
        .filter(|pattern| url.starts_with(pattern.as_str()))
        .max_by_key(|pattern| pattern.len())
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the persistent response for a URL prefix.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        lock(&self.responses).insert(url.to_string(), response);
    }

    /// Queue a one-shot response for a URL prefix.
    pub fn push_response(&self, url: &str, response: MockResponse) {
        lock(&self.queued)
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        *lock(&self.default_response) = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests recorded so far.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    fn record_request(&self, method: &str, url: &str, headers: &Headers, body: Option<String>) {
        lock(&self.requests).push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });
    }

    fn get_response(&self, url: &str) -> Option<MockResponse> {
        {
            let mut queued = lock(&self.queued);
            let key = longest_prefix(&queued, url).cloned();
            if let Some(key) = key {
                if let Some(response) = queued.get_mut(&key).and_then(VecDeque::pop_front) {
                    return Some(response);
                }
            }
        }

        let responses = lock(&self.responses);
        if let Some(key) = longest_prefix(&responses, url) {
            return responses.get(key).cloned();
        }
        drop(responses);

        lock(&self.default_response).clone()
    }

    async fn respond(&self, url: &str) -> Result<Response, HttpError> {
        match self.get_response(url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            Some(MockResponse::Delayed(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            Some(MockResponse::Pending) => futures::future::pending().await,
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("GET", url, headers, None);
        self.respond(url).await
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("POST", url, headers, Some(body.to_string()));
        self.respond(url).await
    }
}
