//! Google Calendar API client.
//!
//! This module provides a low-level HTTP client for the Google Calendar API,
//! handling authentication, URL resolution, status mapping and response
//! parsing. Responses are kept as raw JSON; shaping them is up to the
//! primitives built on top.

use calbridge_core::{Options, to_google_date_time};
use reqwest::{Method, StatusCode};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::config::GoogleConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::remote::BoxFuture;

/// Provider name attached to errors.
pub(crate) const PROVIDER: &str = "google";

/// Query keys that Google expects as RFC 3339 timestamps.
const TIMESTAMP_KEYS: [&str; 3] = ["timeMin", "timeMax", "updatedMin"];

/// A single Calendar API request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base, or an absolute URL.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Creates a request without query or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Sets the query parameters.
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Sets the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Sends Calendar API requests.
///
/// [`GoogleCalendarClient`] is the HTTP implementation; the primitives only
/// depend on this trait.
pub trait GoogleTransport: Send + Sync {
    /// Executes a request and returns the parsed JSON body.
    fn execute(&self, request: ApiRequest) -> BoxFuture<'_, ProviderResult<Value>>;
}

/// Google Calendar API client.
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl GoogleCalendarClient {
    /// Creates a new Google Calendar client from the given configuration.
    pub fn new(config: &GoogleConfig) -> ProviderResult<Self> {
        config.validate()?;
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
                    .with_provider(PROVIDER)
            })?;

        Ok(Self {
            http_client,
            access_token: config.access_token.clone(),
            base_url: config.base_url.clone(),
        })
    }

    /// Resolves a path against the API base URL.
    ///
    /// Absolute `http(s)` URLs are used unchanged.
    pub fn resolve_url(&self, path: &str) -> String {
        resolve_url(&self.base_url, path)
    }

    /// Sends a request and returns the parsed JSON body.
    ///
    /// Empty bodies (e.g. `204 No Content` on deletes) yield `{}`.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> ProviderResult<Value> {
        let url = self.resolve_url(path);
        debug!(%method, %url, "google request");

        let mut request = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(&self.access_token);

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            let err = if e.is_timeout() {
                ProviderError::network("request timeout")
            } else if e.is_connect() {
                ProviderError::network(format!("connection failed: {}", e))
            } else {
                ProviderError::network(format!("request failed: {}", e))
            };
            err.with_provider(PROVIDER).with_source(e)
        })?;

        let status = response.status();

        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let text = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read response: {}", e))
                .with_provider(PROVIDER)
                .with_source(e)
        })?;

        if !status.is_success() {
            let err = error_for_status(status, &text, retry_after);
            warn!(%method, %url, %status, "google request failed: {}", err.message());
            return Err(err);
        }

        parse_body(&text)
    }
}

impl GoogleTransport for GoogleCalendarClient {
    fn execute(&self, request: ApiRequest) -> BoxFuture<'_, ProviderResult<Value>> {
        Box::pin(async move {
            self.send(
                request.method,
                &request.path,
                &request.query,
                request.body.as_ref(),
            )
            .await
        })
    }
}

/// Resolves `path` against `base`.
pub(crate) fn resolve_url(base: &str, path: &str) -> String {
    if let Ok(url) = url::Url::parse(path) {
        if matches!(url.scheme(), "http" | "https") {
            return path.to_string();
        }
    }
    let base = base.trim_end_matches('/');
    if path.is_empty() {
        base.to_string()
    } else if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Path of a calendar resource.
pub(crate) fn calendar_path(calendar_id: &str) -> String {
    format!("/calendars/{}", urlencoding::encode(calendar_id))
}

/// Path of a calendar's event collection.
pub(crate) fn events_path(calendar_id: &str) -> String {
    format!("{}/events", calendar_path(calendar_id))
}

/// Path of a single event.
pub(crate) fn event_path(calendar_id: &str, event_id: &str) -> String {
    format!(
        "{}/{}",
        events_path(calendar_id),
        urlencoding::encode(event_id)
    )
}

/// Turns options into query parameters, skipping the given keys.
///
/// Arrays become repeated parameters, `null` is dropped, objects are sent
/// as JSON text. Epoch milliseconds under `timeMin`, `timeMax` and
/// `updatedMin` are rendered as RFC 3339.
pub(crate) fn query_pairs(options: &Options, skip: &[&str]) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in options {
        if skip.contains(&key.as_str()) {
            continue;
        }
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = query_value(key, item) {
                        pairs.push((key.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = query_value(key, other) {
                    pairs.push((key.clone(), text));
                }
            }
        }
    }
    pairs
}

fn query_value(key: &str, value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if TIMESTAMP_KEYS.contains(&key) => n
            .as_i64()
            .and_then(|ms| to_google_date_time(ms).ok())
            .or_else(|| Some(n.to_string())),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Removes the given keys from a copy of `options`, yielding a request body.
pub(crate) fn body_without(options: &Options, keys: &[&str]) -> Value {
    let body: Map<String, Value> = options
        .iter()
        .filter(|(k, _)| !keys.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Value::Object(body)
}

fn parse_body(text: &str) -> ProviderResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(text).map_err(|e| {
        ProviderError::invalid_response(format!("failed to parse response: {}", e))
            .with_provider(PROVIDER)
            .with_source(e)
    })
}

/// Extracts the message from a Google error body.
///
/// Google answers `{"error": {"code": 404, "message": "Not Found", ...}}`;
/// older endpoints answer `{"error": "invalid_grant"}`.
fn google_error_message(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map(str::to_string)
}

/// Maps a non-success status to a provider error.
pub(crate) fn error_for_status(
    status: StatusCode,
    body: &str,
    retry_after: Option<u64>,
) -> ProviderError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(google_error_message)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body.trim().to_string()
            }
        });

    let err = match status {
        StatusCode::UNAUTHORIZED => ProviderError::authentication(message),
        StatusCode::FORBIDDEN => ProviderError::authorization(message),
        StatusCode::NOT_FOUND => ProviderError::not_found(message),
        StatusCode::GONE => ProviderError::gone(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(format!(
            "{}{}",
            message,
            retry_after
                .map(|s| format!(", retry after {} seconds", s))
                .unwrap_or_default()
        )),
        s if s.is_server_error() => ProviderError::server(format!("API error ({}): {}", s, message)),
        _ => ProviderError::bad_request(message),
    };

    let details = parsed.unwrap_or_else(|| Value::String(body.to_string()));
    err.with_provider(PROVIDER).with_details(details)
}
