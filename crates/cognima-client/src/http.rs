//! HTTP backend abstraction.
//!
//! The transport engine and the streaming downloader talk to the network
//! only through [`HttpBackend`], so both can be exercised against scripted
//! responses. The production implementation wraps `reqwest`.

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use cognima_core::{RetrievalError, RetrievalResult};
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::endpoint::HttpMethod;

/// Chunked response body.
pub type ByteStream = Pin<Box<dyn Stream<Item = RetrievalResult<Bytes>> + Send>>;

/// A fully resolved outgoing request.
#[derive(Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    #[must_use]
    pub const fn get(url: Url) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of the first header named `name`, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

// Header values may hold credentials.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &header_names)
            .field("body", &self.body.is_some())
            .finish()
    }
}

/// A buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl HttpResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// A response whose body is consumed incrementally.
pub struct StreamingResponse {
    pub status: u16,
    pub content_type: Option<String>,
    /// Length declared by the server, when it declared one.
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Trait for HTTP backends.
///
/// Implementations perform exactly one attempt per call; retrying, deadlines
/// and status classification belong to the caller.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Send a request and buffer the whole response body.
    async fn send(&self, request: HttpRequest) -> RetrievalResult<HttpResponse>;

    /// Send a request and return as soon as headers arrive.
    async fn open_stream(&self, request: HttpRequest) -> RetrievalResult<StreamingResponse>;
}

/// Production HTTP backend using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
}

impl ReqwestBackend {
    /// Create a new reqwest backend with the given configuration.
    ///
    /// Only the connect phase is bounded here. Whole-call budgets are applied
    /// by the transport engine, and streams are bounded by the downloader.
    pub fn new(config: &ClientConfig) -> RetrievalResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| RetrievalError::configuration("http_client", e.to_string()))?;
        Ok(Self { client })
    }

    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(request.url),
            HttpMethod::Post => self.client.post(request.url),
        };
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.json(&body);
        }
        builder
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn send(&self, request: HttpRequest) -> RetrievalResult<HttpResponse> {
        let response = self
            .build_request(request)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status().as_u16();
        let content_type = content_type(response.headers());
        let body = response.bytes().await.map_err(transport_error)?;
        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }

    async fn open_stream(&self, request: HttpRequest) -> RetrievalResult<StreamingResponse> {
        let response = self
            .build_request(request)
            .send()
            .await
            .map_err(transport_error)?;
        Ok(StreamingResponse {
            status: response.status().as_u16(),
            content_type: content_type(response.headers()),
            content_length: response.content_length(),
            body: Box::pin(
                response
                    .bytes_stream()
                    .map(|chunk| chunk.map_err(transport_error)),
            ),
        })
    }
}

fn content_type(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn transport_error(err: reqwest::Error) -> RetrievalError {
    RetrievalError::transport(err.without_url().to_string())
}

/// Map a non-success status and its body to the error taxonomy.
///
/// 403 and 429 are rate limits (the caller's tier is exhausted), 400 is a
/// rejected request, anything else keeps its status.
pub fn classify_status(status: u16, body: &[u8]) -> RetrievalError {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    let message = error_message(parsed.as_ref(), body).unwrap_or_else(|| reason(status));
    match status {
        403 | 429 => RetrievalError::rate_limit(status, message, parsed),
        400 => RetrievalError::invalid_request(message),
        _ => RetrievalError::http(status, message),
    }
}

fn error_message(parsed: Option<&Value>, body: &[u8]) -> Option<String> {
    const MAX_TEXT: usize = 200;

    if let Some(value) = parsed {
        return ["message", "error", "msg", "detail"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str))
            .map(str::to_string);
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.chars().take(MAX_TEXT).collect())
}

fn reason(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map_or_else(|| format!("HTTP {status}"), str::to_string)
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================
