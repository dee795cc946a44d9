//! The command channel: one chokepoint for every backend request.
//!
//! A call acquires the shared [`ActivityLock`] (unless told not to), injects
//! the session cookies, issues one request under a deadline, absorbs any
//! `Set-Cookie` headers and decodes the `{code, data}` envelope. The
//! activity guard is an RAII value, so the busy count is released whether
//! the call succeeds, fails, times out, is aborted or is simply dropped.

use futures::future::{AbortRegistration, Abortable};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

use crate::activity::ActivityLock;
use crate::config::ConsoleConfig;
use crate::envelope::Envelope;
use crate::error::{
    classify_http_error, ConsoleError, ConsoleResult, ErrorContext, NetworkError, ResultExt,
};
use crate::session::cookies::CookieJar;
use crate::traits::{Headers, HttpClient, Response};

/// Liveness endpoint. Answers 204 with no body.
pub const PING_ENDPOINT: &str = "/ping/";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// HTTP verb of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// Ordered request parameters.
///
/// Sent as the query string for GET and as an urlencoded form for POST.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.push((key.into(), value.to_string()));
    }

    /// Merge in extra pairs, keeping their order.
    pub fn extend<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: ToString,
    {
        for (key, value) in pairs {
            self.push(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `k1=v1&k2=v2`, percent-encoded.
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        params.extend(iter);
        params
    }
}

impl IntoIterator for Params {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Per-call knobs.
#[derive(Debug)]
pub struct CallOptions {
    /// Hold the activity lock for the duration of the call (default: true)
    pub lock: bool,
    /// Deadline override; `None` uses the configured request timeout
    pub timeout: Option<Duration>,
    /// Cancellation handle paired with a [`futures::future::AbortHandle`]
    pub abort: Option<AbortRegistration>,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            lock: true,
            timeout: None,
            abort: None,
        }
    }
}

impl CallOptions {
    /// Locked call with the default deadline.
    pub fn locked() -> Self {
        Self::default()
    }

    /// Call that leaves the busy indicator alone (status polls, teardown).
    pub fn unlocked() -> Self {
        Self {
            lock: false,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_abort(mut self, registration: AbortRegistration) -> Self {
        self.abort = Some(registration);
        self
    }
}

/// Issues requests against the backend on behalf of every plugin.
#[derive(Clone)]
pub struct CommandChannel {
    http: Arc<dyn HttpClient>,
    config: Arc<ConsoleConfig>,
    cookies: Arc<CookieJar>,
    activity: Arc<ActivityLock>,
}

impl fmt::Debug for CommandChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandChannel")
            .field("base_url", &self.config.base_url)
            .field("in_flight", &self.activity.count())
            .finish()
    }
}

impl CommandChannel {
    pub fn new(http: Arc<dyn HttpClient>, config: ConsoleConfig, cookies: Arc<CookieJar>) -> Self {
        Self {
            http,
            config: Arc::new(config),
            cookies,
            activity: ActivityLock::new(),
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn cookies(&self) -> &Arc<CookieJar> {
        &self.cookies
    }

    pub fn activity(&self) -> &Arc<ActivityLock> {
        &self.activity
    }

    /// Issue one command and decode its envelope.
    pub async fn call(
        &self,
        endpoint: &str,
        method: Method,
        params: Params,
        options: CallOptions,
    ) -> ConsoleResult<Envelope> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::debug_span!("command", %method, endpoint, request_id = %request_id);

        async {
            let response = self.request(endpoint, method, &params, options).await?;
            let envelope: Envelope = response.json().map_err(|e| NetworkError::InvalidResponse {
                message: e.to_string(),
            })?;
            tracing::debug!(code = envelope.code, "envelope received");
            Ok(envelope)
        }
        .instrument(span)
        .await
        .map_err(|err: ConsoleError| {
            tracing::warn!(endpoint, request_id = %request_id, "command failed: {}", err);
            err.with_context(
                ErrorContext::new(format!("{} {}", method, endpoint))
                    .with_endpoint(endpoint)
                    .with_request_id(request_id.clone()),
            )
        })
    }

    /// Callback form of [`call`](Self::call).
    ///
    /// Exactly one of `on_success` / `on_error` runs. When `options.lock`
    /// is set the activity lock stays held until that callback returns.
    pub async fn comm<R>(
        &self,
        endpoint: &str,
        method: Method,
        params: Params,
        mut options: CallOptions,
        on_success: impl FnOnce(Envelope) -> R,
        on_error: impl FnOnce(ConsoleError) -> R,
    ) -> R {
        let guard = options.lock.then(|| self.activity.acquire());
        options.lock = false;

        let result = match self.call(endpoint, method, params, options).await {
            Ok(envelope) => on_success(envelope),
            Err(err) => on_error(err),
        };
        drop(guard);
        result
    }

    /// Liveness check. Unlocked; only the status matters.
    pub async fn ping(&self) -> ConsoleResult<()> {
        self.request(PING_ENDPOINT, Method::Get, &Params::new(), CallOptions::unlocked())
            .await
            .with_context(|| ErrorContext::new("ping").with_endpoint(PING_ENDPOINT))
            .map(|_| ())
    }

    /// Send one request and check its status. The envelope is not decoded.
    async fn request(
        &self,
        endpoint: &str,
        method: Method,
        params: &Params,
        options: CallOptions,
    ) -> ConsoleResult<Response> {
        let _guard = options.lock.then(|| self.activity.acquire());
        let deadline = options.timeout.unwrap_or(self.config.request_timeout);

        let mut url = self.config.url(endpoint);
        let mut headers = Headers::new();
        headers.insert("X-Requested-With".to_string(), "XMLHttpRequest".to_string());
        if let Some(cookie) = self.cookies.header_value() {
            headers.insert("Cookie".to_string(), cookie);
        }

        let body = match method {
            Method::Get => {
                if !params.is_empty() {
                    url.push(if url.contains('?') { '&' } else { '?' });
                    url.push_str(&params.encode());
                }
                None
            }
            Method::Post => {
                headers.insert("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string());
                Some(params.encode())
            }
        };

        tracing::debug!(%url, timeout_ms = deadline.as_millis() as u64, "sending request");

        let send = async {
            match &body {
                Some(body) => self.http.post(&url, body, &headers).await,
                None => self.http.get(&url, &headers).await,
            }
        };

        let sent = match options.abort {
            Some(registration) => {
                match tokio::time::timeout(deadline, Abortable::new(send, registration)).await {
                    Ok(Ok(result)) => Ok(result),
                    Ok(Err(_aborted)) => Err(NetworkError::Cancelled),
                    Err(_elapsed) => Err(timeout_error(endpoint, deadline)),
                }
            }
            None => tokio::time::timeout(deadline, send)
                .await
                .map_err(|_elapsed| timeout_error(endpoint, deadline)),
        }?;

        let response = sent.map_err(|err| classify_http_error(err, &url))?;

        if let Some(set_cookie) = response.header("set-cookie") {
            self.cookies.absorb_set_cookie(set_cookie);
            if let Err(err) = self.cookies.save() {
                tracing::warn!("Failed to persist cookies: {}", err);
            }
        }

        if !response.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(NetworkError::HttpStatus {
                status: response.status,
                message: truncate(&message, 200),
            }
            .into());
        }

        Ok(response)
    }
}

fn timeout_error(endpoint: &str, deadline: Duration) -> NetworkError {
    NetworkError::Timeout {
        endpoint: endpoint.to_string(),
        duration_ms: deadline.as_millis() as u64,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
