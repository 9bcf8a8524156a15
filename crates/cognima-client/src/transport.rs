//! Transport engine: validation, authentication, retry and status mapping.

use std::sync::Arc;
use std::time::Duration;

use cognima_core::{Credential, RetrievalError, RetrievalResult};
use serde_json::Value;
use tokio::time::Instant;

use crate::config::ClientConfig;
use crate::endpoint::{AuthStyle, EndpointDescriptor, ResponseShape};
use crate::http::{HttpBackend, HttpRequest, HttpResponse, classify_status};
use crate::params::Params;

/// Per-call options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Overall budget for the call, covering every attempt and backoff sleep.
    pub deadline: Option<Duration>,
}

impl CallOptions {
    #[must_use]
    pub const fn with_deadline(deadline: Duration) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }
}

/// A successful, uninterpreted JSON response.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub endpoint: &'static str,
    pub status: u16,
    pub body: Value,
    /// Attempts made, including the successful one.
    pub attempts: u32,
}

/// Tracks an optional overall budget from the moment a call starts.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    started: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    pub(crate) fn start(budget: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    /// Remaining budget, `None` when unbounded.
    pub(crate) fn remaining(&self) -> RetrievalResult<Option<Duration>> {
        match self.budget {
            None => Ok(None),
            Some(budget) => budget
                .checked_sub(self.started.elapsed())
                .filter(|left| !left.is_zero())
                .map(Some)
                .ok_or_else(|| RetrievalError::timeout(budget)),
        }
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.remaining().is_err()
    }

    pub(crate) fn error(&self) -> RetrievalError {
        RetrievalError::timeout(self.budget.unwrap_or_default())
    }
}

/// Executes descriptor-driven calls against an [`HttpBackend`].
///
/// The engine holds no per-caller state: credentials arrive with each call,
/// so one engine can serve concurrent callers.
#[derive(Debug)]
pub struct TransportEngine<B> {
    backend: Arc<B>,
    config: Arc<ClientConfig>,
}

impl<B> Clone for TransportEngine<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: Arc::clone(&self.config),
        }
    }
}

impl<B: HttpBackend> TransportEngine<B> {
    /// Create an engine. Fails with `Configuration` for unusable settings.
    pub fn new(backend: Arc<B>, config: Arc<ClientConfig>) -> RetrievalResult<Self> {
        config.validate()?;
        Ok(Self { backend, config })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Validate `params`, attach credentials and resolve the outgoing request.
    pub fn prepare(
        &self,
        descriptor: &EndpointDescriptor,
        params: &Params,
        credential: Option<&Credential>,
    ) -> RetrievalResult<HttpRequest> {
        descriptor.validate(params)?;

        let url = descriptor.build_url(self.config.base_url(descriptor.host), params)?;
        let mut request = HttpRequest {
            method: descriptor.method,
            url,
            headers: Vec::new(),
            body: descriptor.build_body(params),
        };
        if descriptor.shape != ResponseShape::Binary {
            request = request.with_header("Accept", "application/json");
        }

        if descriptor.auth.is_required() {
            let credential = credential.filter(|c| !c.is_blank()).ok_or_else(|| {
                RetrievalError::validation(
                    "credential",
                    format!("{} requires an API key", descriptor.name),
                )
            })?;
            request = match descriptor.auth {
                AuthStyle::Header(name) => request.with_header(name, credential.expose()),
                AuthStyle::Bearer => request
                    .with_header("Authorization", format!("Bearer {}", credential.expose())),
                AuthStyle::None => request,
            };
        }
        Ok(request)
    }

    /// Perform one logical call, retrying transient failures.
    pub async fn execute(
        &self,
        descriptor: &EndpointDescriptor,
        params: &Params,
        credential: Option<&Credential>,
        options: CallOptions,
    ) -> RetrievalResult<RawResponse> {
        if descriptor.shape == ResponseShape::Binary {
            return Err(RetrievalError::configuration(
                descriptor.name,
                "binary endpoint must be streamed through the downloader",
            ));
        }
        let request = self.prepare(descriptor, params, credential)?;
        let deadline = Deadline::start(options.deadline);

        let (response, attempts) = self
            .send_with_retry(descriptor.name, &request, &deadline)
            .await?;
        let body = serde_json::from_slice(&response.body).map_err(|e| {
            RetrievalError::provider(format!("{}: response is not JSON ({e})", descriptor.name))
        })?;
        Ok(RawResponse {
            endpoint: descriptor.name,
            status: response.status,
            body,
            attempts,
        })
    }

    async fn send_with_retry(
        &self,
        endpoint: &str,
        request: &HttpRequest,
        deadline: &Deadline,
    ) -> RetrievalResult<(HttpResponse, u32)> {
        let policy = self.config.retry;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let remaining = deadline.remaining()?;
            let attempt_budget =
                remaining.map_or(self.config.timeout, |r| r.min(self.config.timeout));

            tracing::debug!(
                endpoint,
                attempt,
                method = request.method.as_str(),
                "Sending request"
            );
            let sent = self.backend.send(request.clone());
            let result = match tokio::time::timeout(attempt_budget, sent).await {
                Ok(result) => result,
                Err(_) => Err(RetrievalError::timeout(attempt_budget)),
            };

            let error = match result {
                Ok(response) if response.is_success() => {
                    tracing::debug!(
                        endpoint,
                        attempt,
                        status = response.status,
                        "Request succeeded"
                    );
                    return Ok((response, attempt));
                }
                Ok(response) => classify_status(response.status, &response.body),
                Err(e) => e,
            };

            if error.is_retryable() && deadline.is_exhausted() {
                return Err(deadline.error());
            }
            if let RetrievalError::RateLimit { status, .. } = &error {
                tracing::warn!(endpoint, status, "Rate limited; not retrying");
            }
            if !error.is_retryable() || attempt >= policy.max_attempts() {
                return Err(error);
            }

            let delay = policy.delay_for(attempt);
            if let Some(left) = deadline.remaining()? {
                if delay >= left {
                    return Err(deadline.error());
                }
            }
            tracing::warn!(
                endpoint,
                attempt,
                error = error.label(),
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Transient failure; retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::HttpMethod;
    use crate::http::testing::{FakeBackend, Scripted};
    use crate::registry;
    use crate::retry::RetryPolicy;
    use serde_json::json;

    fn engine(backend: &FakeBackend, retry: RetryPolicy) -> TransportEngine<FakeBackend> {
        let config = ClientConfig::new()
            .with_single_host("https://api.test/api/v1")
            .with_timeout(Duration::from_secs(5))
            .with_retry(retry);
        TransportEngine::new(Arc::new(backend.clone()), Arc::new(config)).unwrap()
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::default()
            .with_base_delay(Duration::from_millis(10))
            .with_max_delay(Duration::from_millis(40))
            .with_jitter_percent(0)
    }

    fn url_params() -> Params {
        Params::new().with("url", "https://www.facebook.com/watch?v=1")
    }

    #[tokio::test]
    async fn test_header_auth_and_success() {
        let backend =
            FakeBackend::new().then(Scripted::json(200, &json!({"success": true, "videos": []})));
        let engine = engine(&backend, fast_retry());
        let descriptor = registry::lookup("facebook.download").unwrap();

        let raw = engine
            .execute(
                descriptor,
                &url_params(),
                Some(&Credential::new("ck_key")),
                CallOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(raw.endpoint, "facebook.download");
        assert_eq!(raw.attempts, 1);
        assert_eq!(raw.body["success"], true);

        let sent = &backend.requests()[0];
        assert_eq!(sent.header("apikey"), Some("ck_key"));
        assert_eq!(sent.url.path(), "/api/v1/facebook/download");
        assert!(sent.body.is_none());
    }

    #[tokio::test]
    async fn test_bearer_and_post_body() {
        let backend = FakeBackend::new()
            .then(Scripted::json(200, &json!({"success": true})))
            .then(Scripted::json(200, &json!({"success": true})));
        let engine = engine(&backend, fast_retry());
        let key = Credential::new("tok");

        engine
            .execute(
                registry::lookup("twitter.info").unwrap(),
                &Params::new().with("url", "https://x.com/a/status/1"),
                Some(&key),
                CallOptions::default(),
            )
            .await
            .unwrap();
        engine
            .execute(
                registry::lookup("lyrics.search").unwrap(),
                &Params::new().with("query", "numb"),
                Some(&key),
                CallOptions::default(),
            )
            .await
            .unwrap();

        let sent = backend.requests();
        assert_eq!(sent[0].header("Authorization"), Some("Bearer tok"));
        assert_eq!(sent[1].method, HttpMethod::Post);
        assert_eq!(sent[1].header("X-API-Key"), Some("tok"));
        assert_eq!(sent[1].body, Some(json!({"query": "numb"})));
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_io() {
        let backend = FakeBackend::new();
        let engine = engine(&backend, fast_retry());
        let err = engine
            .execute(
                registry::lookup("facebook.download").unwrap(),
                &url_params(),
                None,
                CallOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::Validation { ref field, .. } if field == "credential"
        ));

        let blank = engine
            .execute(
                registry::lookup("facebook.download").unwrap(),
                &url_params(),
                Some(&Credential::new(" ")),
                CallOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(blank.is_caller_error());
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_params_fail_before_io() {
        let backend = FakeBackend::new();
        let engine = engine(&backend, fast_retry());
        let err = engine
            .execute(
                registry::lookup("alldl").unwrap(),
                &Params::new().with("url", "not a url"),
                None,
                CallOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::Validation { .. }));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_server_errors_then_succeeds() {
        let backend = FakeBackend::new()
            .then(Scripted::json(503, &json!({"message": "busy"})))
            .then(Scripted::Error(RetrievalError::transport("connection reset")))
            .then(Scripted::json(200, &json!({"success": true, "media": []})));
        let engine = engine(&backend, fast_retry());

        let raw = engine
            .execute(
                registry::lookup("alldl").unwrap(),
                &url_params(),
                None,
                CallOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(raw.attempts, 3);
        assert_eq!(backend.request_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let backend = FakeBackend::new()
            .then(Scripted::json(500, &json!({})))
            .then(Scripted::json(502, &json!({})))
            .then(Scripted::json(504, &json!({"error": "upstream timeout"})));
        let engine = engine(&backend, fast_retry().with_max_retries(2));

        let err = engine
            .execute(
                registry::lookup("alldl").unwrap(),
                &url_params(),
                None,
                CallOptions::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err, RetrievalError::http(504, "upstream timeout"));
        assert_eq!(backend.request_count(), 3);
    }

    #[tokio::test]
    async fn test_rate_limit_is_not_retried() {
        let backend = FakeBackend::new()
            .then(Scripted::json(429, &json!({"success": false, "message": "Too many requests"})));
        let engine = engine(&backend, fast_retry());

        let err = engine
            .execute(
                registry::lookup("alldl").unwrap(),
                &url_params(),
                None,
                CallOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::RateLimit { status: 429, ref message, .. }
                if message == "Too many requests"
        ));
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test]
    async fn test_bad_request_is_not_retried() {
        let backend =
            FakeBackend::new().then(Scripted::json(400, &json!({"error": "Invalid URL"})));
        let engine = engine(&backend, fast_retry());
        let err = engine
            .execute(
                registry::lookup("alldl").unwrap(),
                &url_params(),
                None,
                CallOptions::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err, RetrievalError::invalid_request("Invalid URL"));
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_bounds_a_hanging_call() {
        let backend = FakeBackend::new().then(Scripted::Hang);
        let engine = engine(&backend, fast_retry());

        let err = engine
            .execute(
                registry::lookup("alldl").unwrap(),
                &url_params(),
                None,
                CallOptions::with_deadline(Duration::from_secs(2)),
            )
            .await
            .unwrap_err();
        assert_eq!(err, RetrievalError::timeout(Duration::from_secs(2)));
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_timeout_is_retried() {
        let backend = FakeBackend::new()
            .then(Scripted::Hang)
            .then(Scripted::json(200, &json!({"ok": true})));
        let engine = engine(&backend, fast_retry());

        let raw = engine
            .execute(
                registry::lookup("alldl").unwrap(),
                &url_params(),
                None,
                CallOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(raw.attempts, 2);
    }

    #[tokio::test]
    async fn test_non_json_success_body() {
        let backend = FakeBackend::new().then(Scripted::Response(HttpResponse {
            status: 200,
            content_type: Some("text/html".to_string()),
            body: bytes::Bytes::from_static(b"<html></html>"),
        }));
        let engine = engine(&backend, fast_retry());
        let err = engine
            .execute(
                registry::lookup("alldl").unwrap(),
                &url_params(),
                None,
                CallOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_binary_endpoint_rejected() {
        let backend = FakeBackend::new();
        let engine = engine(&backend, fast_retry());
        let err = engine
            .execute(
                registry::lookup("filmes.watch").unwrap(),
                &Params::new().with("id", "42"),
                Some(&Credential::new("k")),
                CallOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(err.is_caller_error());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ClientConfig::new().with_timeout(Duration::ZERO);
        let result = TransportEngine::new(Arc::new(FakeBackend::new()), Arc::new(config));
        assert!(matches!(result, Err(RetrievalError::Configuration { .. })));
    }
}
