//! Retrieval error taxonomy.
//!
//! These errors are serializable and do not depend on adapter error types
//! like `reqwest::Error` or `std::io::Error`. Adapters capture the relevant
//! message and kind as strings at the boundary.
//!
//! No variant ever carries a credential value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for retrieval operations.
pub type RetrievalResult<T> = Result<T, RetrievalError>;

/// Error type shared by every component of the retrieval client.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RetrievalError {
    /// Caller input rejected before any I/O happened.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// Parameter or option that failed validation.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// Connection-level failure (DNS, TLS, reset, body read).
    #[error("Transport error: {message}")]
    Transport {
        /// Detailed error message.
        message: String,
    },

    /// The call's deadline elapsed before it completed.
    #[error("Deadline of {budget_ms}ms exceeded")]
    Timeout {
        /// Budget the call was given, in milliseconds.
        budget_ms: u64,
    },

    /// The provider rejected the call for the caller's access tier (HTTP 403/429).
    #[error("Rate limited (HTTP {status}): {message}")]
    RateLimit {
        /// HTTP status, 403 or 429.
        status: u16,
        /// Message parsed from the error body, if any.
        message: String,
        /// Parsed error body for callers that want to defer and inspect it.
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<serde_json::Value>,
    },

    /// The provider rejected the request as malformed (HTTP 400).
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Message parsed from the error body.
        message: String,
    },

    /// Any other non-success HTTP status.
    #[error("Request failed with HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Message parsed from the error body, or the canonical reason.
        message: String,
    },

    /// The remote envelope reported `success: false`.
    #[error("Provider error: {message}")]
    Provider {
        /// Message from the envelope's `error` / `message` fields.
        message: String,
    },

    /// The payload did not have the shape the endpoint's profile expects.
    #[error("Unexpected payload shape: missing '{missing_field}'")]
    Normalization {
        /// Dotted path of the first required field that was absent.
        missing_field: String,
    },

    /// A stream ended with fewer (or more) bytes than the server declared.
    #[error("Incomplete transfer: expected {expected} bytes, wrote {written}")]
    IncompleteTransfer {
        /// Declared content length.
        expected: u64,
        /// Bytes actually written to the sink.
        written: u64,
    },

    /// Writing to the caller's sink failed.
    #[error("Sink error ({kind}): {message}")]
    Sink {
        /// The kind of I/O error (e.g. "`PermissionDenied`").
        kind: String,
        /// Detailed error message.
        message: String,
    },

    /// A caller-supplied option is out of range or unrecognized.
    #[error("Invalid configuration for '{option}': {message}")]
    Configuration {
        /// Name of the offending option.
        option: String,
        /// What was wrong with it.
        message: String,
    },

    /// A batch input was never attempted because the batch deadline ran out.
    #[error("Skipped: batch deadline exhausted")]
    Skipped,
}

impl RetrievalError {
    /// Create a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a timeout error from the budget that was exceeded.
    #[must_use]
    pub fn timeout(budget: std::time::Duration) -> Self {
        Self::Timeout {
            budget_ms: u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Create a rate-limit error.
    pub fn rate_limit(
        status: u16,
        message: impl Into<String>,
        body: Option<serde_json::Value>,
    ) -> Self {
        Self::RateLimit {
            status,
            message: message.into(),
            body,
        }
    }

    /// Create an invalid-request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an error for an unclassified HTTP status.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Create a provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Create a normalization error naming the missing field.
    pub fn normalization(missing_field: impl Into<String>) -> Self {
        Self::Normalization {
            missing_field: missing_field.into(),
        }
    }

    /// Create an incomplete-transfer error.
    #[must_use]
    pub const fn incomplete_transfer(expected: u64, written: u64) -> Self {
        Self::IncompleteTransfer { expected, written }
    }

    /// Create a sink error from a `std::io::Error`.
    ///
    /// This captures the error kind name and message for serialization.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        let kind = err.kind();
        Self::Sink {
            kind: format!("{kind:?}"),
            message: err.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(option: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            option: option.into(),
            message: message.into(),
        }
    }

    /// Check if the transport engine may retry after this error.
    ///
    /// Connection failures, per-attempt timeouts and 5xx responses are
    /// transient. Everything the provider explicitly rejected is not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Check if this error was caused by the caller rather than the remote side.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Configuration { .. })
    }

    /// Short machine-readable label, used as a structured log field.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::RateLimit { .. } => "rate_limit",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Http { .. } => "http",
            Self::Provider { .. } => "provider",
            Self::Normalization { .. } => "normalization",
            Self::IncompleteTransfer { .. } => "incomplete_transfer",
            Self::Sink { .. } => "sink",
            Self::Configuration { .. } => "configuration",
            Self::Skipped => "skipped",
        }
    }
}
