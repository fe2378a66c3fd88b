//! HTTP transport for calendar provider calls.
//!
//! Rate limiting (429) and server errors are retried with exponential
//! backoff, honouring `Retry-After` when the provider sends one. Connection
//! failures and timeouts are retried the same way. Once the attempts are
//! spent the call fails with `ProviderUnavailable`, so a caller only ever
//! sees a final response or an outage.

use std::time::Duration;

use finsync_domain::{FinSyncError, Result};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::errors::InfraError;

const DEFAULT_USER_AGENT: &str = concat!("finsync/", env!("CARGO_PKG_VERSION"));

/// How often and how patiently a provider call is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub base_backoff: Duration,
    /// Upper bound for any single wait, `Retry-After` included.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `retry` (1-based).
    fn delay_for(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        let doubling = 1u32 << retry.saturating_sub(1).min(8);
        retry_after
            .unwrap_or_else(|| self.base_backoff.saturating_mul(doubling))
            .min(self.max_backoff)
    }
}

/// Why an attempt is worth repeating.
enum Transient {
    Status { status: StatusCode, retry_after: Option<Duration> },
    Transport(String),
}

impl Transient {
    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Status { retry_after, .. } => *retry_after,
            Self::Transport(_) => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Status { status, .. } => format!("HTTP {status}"),
            Self::Transport(reason) => reason.clone(),
        }
    }
}

/// Provider-facing HTTP client.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    retry: RetryPolicy,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send `builder`, retrying transient failures.
    ///
    /// The request body must be buffered (JSON bodies are) so it can be
    /// replayed. Client errors other than 429 come back as responses for the
    /// caller to interpret.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let attempts = self.retry.max_attempts.max(1);
        let mut target = String::new();
        let mut last = None;

        for attempt in 1..=attempts {
            let request = builder
                .try_clone()
                .ok_or_else(|| {
                    FinSyncError::Internal("provider request body is not replayable".into())
                })?
                .build()
                .map_err(InfraError::from)?;
            target = format!("{} {}", request.method(), request.url().path());

            let transient = match self.client.execute(request).await {
                Ok(response) if is_retryable_status(response.status()) => Transient::Status {
                    status: response.status(),
                    retry_after: retry_after(&response),
                },
                Ok(response) => {
                    debug!(attempt, %target, status = %response.status(), "provider responded");
                    return Ok(response);
                }
                Err(err) if is_transient(&err) => Transient::Transport(err.to_string()),
                Err(err) => return Err(InfraError::from(err).into()),
            };

            if attempt < attempts {
                let delay = self.retry.delay_for(attempt, transient.retry_after());
                debug!(
                    attempt,
                    %target,
                    reason = %transient.describe(),
                    delay_ms = delay.as_millis() as u64,
                    "retrying provider request"
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            last = Some(transient);
        }

        let reason = last.map(|t| t.describe()).unwrap_or_default();
        warn!(%target, attempts, %reason, "provider request gave up");
        Err(FinSyncError::ProviderUnavailable(format!(
            "{target} failed after {attempts} attempt(s): {reason}"
        )))
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    retry: RetryPolicy,
    user_agent: String,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.retry.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.retry.base_backoff = backoff;
        self
    }

    pub fn max_backoff(mut self, backoff: Duration) -> Self {
        self.retry.max_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .no_proxy()
            .build()
            .map_err(InfraError::from)?;

        Ok(HttpClient { client, retry: self.retry })
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

/// `Retry-After` in delta-seconds form; HTTP dates fall back to backoff.
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
