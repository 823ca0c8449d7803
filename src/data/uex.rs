//! UEX API client
//!
//! Thin async wrapper over the read-only UEX REST API. Every resource is a
//! `GET /<resource>?<params>` returning a JSON object whose `data` field holds
//! the rows. Rate-limited responses are retried a bounded number of times.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::{Params, Upstream};

/// Base URL for the UEX API
pub const UEX_BASE_URL: &str = "https://api.uexcorp.space/2.0";

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const CLIENT_USER_AGENT: &str = concat!("uexbot/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur when fetching from the UEX API
#[derive(Debug, Error)]
pub enum UexError {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("{resource} returned HTTP {status}")]
    Status { status: StatusCode, resource: String },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Client could not be constructed
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl UexError {
    /// HTTP status for upstream status errors
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UexError::Status { status, .. } => Some(*status),
            UexError::RequestFailed(e) => e.status(),
            _ => None,
        }
    }
}

/// Bounded retry on HTTP 429
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts made inside the retry loop
    pub max_attempts: u32,
    /// Fallback delay per attempt number when no `Retry-After` is sent
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying after `attempt` (1-based) was rate limited.
    ///
    /// The server's `Retry-After` seconds win when present and parseable;
    /// otherwise the delay grows linearly with the attempt number.
    pub fn delay(&self, headers: &HeaderMap, attempt: u32) -> Duration {
        parse_retry_after(headers).unwrap_or(self.backoff_step * attempt)
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

/// Client for the UEX API
#[derive(Debug, Clone)]
pub struct UexClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl UexClient {
    /// Create a client, sending `Authorization: Bearer <token>` when a token is given.
    ///
    /// Public resources such as `categories` work without a token.
    pub fn new(token: Option<&str>) -> Result<Self, UexError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .map_err(|e| UexError::Config(format!("bad token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self::with_client(client))
    }

    /// Create a UexClient with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: UEX_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the rate-limit retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform a GET against `resource`.
    ///
    /// A 429 inside the retry loop waits (server `Retry-After`, else linear
    /// back-off) and tries again. Once the loop is exhausted the request is
    /// issued one final time and its outcome is returned as is. Any other
    /// non-success status fails immediately.
    pub async fn fetch(&self, resource: &str, params: &Params) -> Result<Value, UexError> {
        let url = format!("{}/{}", self.base_url, resource);

        for attempt in 1..=self.retry.max_attempts {
            let response = self.send(&url, params).await?;
            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Self::into_json(resource, response).await;
            }
            if attempt == self.retry.max_attempts {
                break;
            }
            let delay = self.retry.delay(response.headers(), attempt);
            warn!(resource, attempt, delay_ms = delay.as_millis() as u64, "rate limited, backing off");
            tokio::time::sleep(delay).await;
        }

        warn!(resource, "retries exhausted, issuing final request");
        let response = self.send(&url, params).await?;
        Self::into_json(resource, response).await
    }

    async fn send(&self, url: &str, params: &Params) -> Result<Response, UexError> {
        debug!(url, ?params, "GET");
        Ok(self.client.get(url).query(params).send().await?)
    }

    async fn into_json(resource: &str, response: Response) -> Result<Value, UexError> {
        let status = response.status();
        if !status.is_success() {
            return Err(UexError::Status {
                status,
                resource: resource.to_string(),
            });
        }
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl Upstream for UexClient {
    async fn get(&self, resource: &str, params: &Params) -> Result<Value, UexError> {
        self.fetch(resource, params).await
    }
}
