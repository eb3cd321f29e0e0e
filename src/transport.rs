//! HTTP transport beneath the wire client.
//!
//! Adapters never touch HTTP directly. They hand a [`WireRequest`] to a
//! [`Transport`] and receive the status code plus the decoded JSON body.
//! Retry policy lives here, not in the adapters.
//!
//! - [`HttpTransport`]: production transport on `reqwest`.
//! - [`MockTransport`]: canned responses and a call log, for tests and
//!   offline use.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::{AuthProvider, NoAuth, TokenAuth};
use crate::config::ClientConfig;
use crate::error::{SlurmError, SlurmResult};

/// HTTP methods used by the REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }

    /// Whether repeating the request leaves the server in the same state.
    pub fn is_idempotent(&self) -> bool {
        matches!(self, Method::Get | Method::Delete)
    }
}

/// A request in wire terms: method, absolute path, query and JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl WireRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Add a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Status code and JSON body. An empty or non-JSON error body is `Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct WireResponse {
    pub status: u16,
    pub body: Value,
}

impl WireResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends wire requests.
///
/// Implementations return `Ok` for any HTTP response, successful or not;
/// `Err` means no response was obtained.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: WireRequest) -> SlurmResult<WireResponse>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    auth: Arc<dyn AuthProvider>,
    max_retries: u32,
    debug: bool,
}

impl HttpTransport {
    /// Build from configuration; credentials come from `config.token`.
    pub fn from_config(config: &ClientConfig) -> SlurmResult<Self> {
        let auth: Arc<dyn AuthProvider> = match &config.token {
            Some(token) => {
                let auth = TokenAuth::new(token.clone());
                match &config.user_name {
                    Some(user) => Arc::new(auth.with_user(user.clone())),
                    None => Arc::new(auth),
                }
            }
            None => Arc::new(NoAuth),
        };
        Self::with_auth(config, auth)
    }

    /// Build from configuration with an explicit credential provider.
    pub fn with_auth(config: &ClientConfig, auth: Arc<dyn AuthProvider>) -> SlurmResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url()?,
            auth,
            max_retries: config.max_retries,
            debug: config.debug,
        })
    }

    fn url(&self, request: &WireRequest) -> SlurmResult<Url> {
        let mut url = self
            .base_url
            .join(&request.path)
            .map_err(|e| SlurmError::validation(format!("invalid path '{}': {e}", request.path)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    async fn send_once(&self, url: &Url, request: &WireRequest) -> Result<WireResponse, reqwest::Error> {
        let builder = match request.method {
            Method::Get => self.client.get(url.clone()),
            Method::Post => self.client.post(url.clone()),
            Method::Delete => self.client.delete(url.clone()),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };
        let response = self.auth.authenticate(builder).send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok(WireResponse::new(status.as_u16(), parse_body(status, &text)))
    }
}

const BASE_BACKOFF_MS: u64 = 100;
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// How a request failed to produce a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    /// Never reached the server.
    Connect,
    /// The server may have acted on the request.
    Timeout,
    Other,
}

impl From<&reqwest::Error> for Failure {
    fn from(err: &reqwest::Error) -> Self {
        if err.is_connect() {
            Failure::Connect
        } else if err.is_timeout() {
            Failure::Timeout
        } else {
            Failure::Other
        }
    }
}

// A timed out POST may already have been applied, so only connect failures
// are retried for it.
fn should_retry(method: Method, failure: Failure, attempt: u32, max_retries: u32) -> bool {
    attempt < max_retries
        && match failure {
            Failure::Connect => true,
            Failure::Timeout => method.is_idempotent(),
            Failure::Other => false,
        }
}

/// Delay before retry number `attempt` (1-based): doubling from 100ms, capped.
fn backoff(attempt: u32) -> Duration {
    2u64.checked_pow(attempt.saturating_sub(1))
        .and_then(|factor| factor.checked_mul(BASE_BACKOFF_MS))
        .map_or(MAX_BACKOFF, Duration::from_millis)
        .min(MAX_BACKOFF)
}

// Error statuses may carry HTML or nothing at all; only success bodies must be JSON.
fn parse_body(status: StatusCode, text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) if !status.is_success() => Value::Null,
        Err(_) => Value::String(text.to_string()),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: WireRequest) -> SlurmResult<WireResponse> {
        let url = self.url(&request)?;
        if self.debug {
            debug!(method = request.method.as_str(), %url, body = ?request.body, "slurmrestd request");
        } else {
            trace!(method = request.method.as_str(), %url, "slurmrestd request");
        }

        let mut attempt = 0;
        loop {
            match self.send_once(&url, &request).await {
                Ok(response) => {
                    if self.debug {
                        debug!(status = response.status, body = %response.body, "slurmrestd response");
                    }
                    if response.is_success() && response.body.is_string() {
                        return Err(SlurmError::InvalidResponse(format!(
                            "{} {} returned a non-JSON body",
                            request.method.as_str(),
                            request.path
                        )));
                    }
                    return Ok(response);
                }
                Err(err)
                    if should_retry(request.method, Failure::from(&err), attempt, self.max_retries) =>
                {
                    attempt += 1;
                    let delay = backoff(attempt);
                    warn!(%url, attempt, ?delay, error = %err, "retrying slurmrestd request");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// In-memory transport with canned responses.
///
/// Routes are keyed by method and path (query ignored). Unrouted requests
/// fail with a transport error. Every request is recorded, routed or not,
/// so tests can assert that no wire call happened.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<HashMap<(Method, String), WireResponse>>>,
    calls: Arc<Mutex<Vec<WireRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `method path` with `status` and `body`.
    pub fn on(&self, method: Method, path: impl Into<String>, status: u16, body: Value) -> &Self {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((method, path.into()), WireResponse::new(status, body));
        self
    }

    /// Requests seen so far.
    pub fn calls(&self) -> Vec<WireRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: WireRequest) -> SlurmResult<WireResponse> {
        let key = (request.method, request.path.clone());
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
            .ok_or_else(|| {
                SlurmError::Transport(format!("no route for {} {}", key.0.as_str(), key.1))
            })
    }
}
