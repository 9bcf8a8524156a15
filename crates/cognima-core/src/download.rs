//! Outcome of a streamed transfer.

use serde::{Deserialize, Serialize};

/// Whether the byte count could be checked against a declared length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompletionStatus {
    /// Bytes written matched the declared content length.
    Verified,
    /// The server declared no length, so completeness is unknown.
    Unverified,
}

/// Terminal record of a completed download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResult {
    /// Sink identifier: a path, or a caller-chosen label for in-memory sinks.
    pub destination: String,
    pub bytes_written: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_length: Option<u64>,
    pub status: CompletionStatus,
}

impl DownloadResult {
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        matches!(self.status, CompletionStatus::Verified)
    }
}
