//! Outbound request execution: pacing, bearer auth, and retry with
//! exponential backoff.

use std::time::Duration;

use rand::Rng;
use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::auth::TokenStore;
use crate::config::EnvironmentConfig;
use crate::error::ClientError;
use crate::limit::{RateLimiter, parse_retry_after};

/// Backoff starts here and doubles per attempt.
const BACKOFF_BASE: Duration = Duration::from_secs(1);
/// Backoff never exceeds this, before jitter.
const BACKOFF_CAP: Duration = Duration::from_secs(30);

/// Statuses worth retrying as transient.
fn is_retryable(status: StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 429 | 500 | 502 | 503 | 504)
}

/// Everything needed to rebuild a request for each attempt.
///
/// `reqwest::Request` bodies are not cloneable, so retries construct a fresh
/// request from this description instead.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            body: None,
        }
    }
}

/// Executes [`RequestSpec`]s with rate limiting and retry.
#[derive(Debug)]
pub struct Dispatcher {
    http: reqwest::Client,
    limiter: RateLimiter,
    max_retries: u32,
}

impl Dispatcher {
    pub fn new(http: reqwest::Client, requests_per_second: u32, max_retries: u32) -> Self {
        Self {
            http,
            limiter: RateLimiter::new(requests_per_second),
            max_retries,
        }
    }

    /// Run the request until it yields a non-retryable response or the retry
    /// budget is spent.
    ///
    /// A 401 or 403 invalidates the cached token and is retried exactly once
    /// with fresh credentials, independent of the transient-status budget.
    ///
    /// # Errors
    ///
    /// [`ClientError::Http`] when the transport keeps failing past the last
    /// retry. Non-success API statuses are returned as responses for the
    /// caller to interpret, except those consumed by the retry loop.
    pub async fn execute(
        &self,
        tokens: &TokenStore,
        env: &EnvironmentConfig,
        spec: &RequestSpec,
    ) -> Result<reqwest::Response, ClientError> {
        let mut attempt: u32 = 0;
        let mut auth_retried = false;

        loop {
            self.limiter.acquire().await;
            let bearer = tokens.bearer(env).await?;

            let mut request = self
                .http
                .request(spec.method.clone(), &spec.url)
                .bearer_auth(bearer);
            if !spec.query.is_empty() {
                request = request.query(&spec.query);
            }
            if let Some(body) = &spec.body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                        if !auth_retried {
                            auth_retried = true;
                            tracing::warn!(%status, env = %env.name, "auth rejected, refreshing token");
                            tokens.invalidate(&env.id).await;
                            continue;
                        }
                        return Ok(response);
                    }
                    if is_retryable(status) && attempt < self.max_retries {
                        let wait = response
                            .headers()
                            .get(reqwest::header::RETRY_AFTER)
                            .and_then(|v| v.to_str().ok())
                            .and_then(parse_retry_after)
                            .unwrap_or_else(|| backoff(attempt));
                        tracing::warn!(
                            %status,
                            attempt,
                            wait_ms = wait.as_millis() as u64,
                            "transient status, retrying"
                        );
                        tokio::time::sleep(wait).await;
                        attempt += 1;
                        continue;
                    }
                    return Ok(response);
                }
                Err(err) => {
                    if attempt < self.max_retries {
                        let wait = backoff(attempt);
                        tracing::warn!(error = %err, attempt, "transport error, retrying");
                        tokio::time::sleep(wait).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(err.into());
                }
            }
        }
    }
}

/// Exponential backoff with ±25% jitter.
fn backoff(attempt: u32) -> Duration {
    let factor = f64::from(2u32.saturating_pow(attempt.min(16)));
    let base = (BACKOFF_BASE.as_secs_f64() * factor).min(BACKOFF_CAP.as_secs_f64());
    let jitter = rand::thread_rng().gen_range(0.75..=1.25);
    Duration::from_secs_f64(base * jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        for code in [408, 429, 500, 502, 503, 504] {
            assert!(is_retryable(StatusCode::from_u16(code).unwrap()), "{code}");
        }
        for code in [200, 201, 400, 401, 403, 404, 422] {
            assert!(!is_retryable(StatusCode::from_u16(code).unwrap()), "{code}");
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        // Jitter is ±25%, so check against widened bounds.
        let b0 = backoff(0);
        assert!(b0 >= Duration::from_secs_f64(0.75) && b0 <= Duration::from_secs_f64(1.25));

        let b2 = backoff(2);
        assert!(b2 >= Duration::from_secs(3) && b2 <= Duration::from_secs(5));

        let b10 = backoff(10);
        assert!(b10 <= Duration::from_secs_f64(30.0 * 1.25));
        assert!(b10 >= Duration::from_secs_f64(30.0 * 0.75));
    }

    #[test]
    fn test_request_spec_defaults() {
        let spec = RequestSpec::new(Method::GET, "https://api.example/v1/users");
        assert!(spec.query.is_empty());
        assert!(spec.body.is_none());
    }
}
