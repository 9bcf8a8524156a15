//! Single direct download links.

use serde::{Deserialize, Serialize};

/// Where a link's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LinkSource {
    /// Fetch from this URL.
    Remote { url: String },
    /// The provider returned the file inline as base64.
    Inline { base64: String },
}

/// A resolved file the caller can hand to the streaming downloader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    pub provider: String,
    pub source: LinkSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Human size as reported (`"12.4 MB"`) when no byte count is given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artists: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl DownloadLink {
    /// A link to a remote URL with no metadata.
    pub fn remote(provider: impl Into<String>, url: impl Into<String>) -> Self {
        Self::with_source(provider, LinkSource::Remote { url: url.into() })
    }

    /// A link carrying an inline base64 payload.
    pub fn inline(provider: impl Into<String>, base64: impl Into<String>) -> Self {
        Self::with_source(
            provider,
            LinkSource::Inline {
                base64: base64.into(),
            },
        )
    }

    fn with_source(provider: impl Into<String>, source: LinkSource) -> Self {
        Self {
            provider: provider.into(),
            source,
            title: None,
            file_name: None,
            mime_type: None,
            size_bytes: None,
            size_label: None,
            artists: Vec::new(),
            duration: None,
            thumbnail: None,
        }
    }

    /// The remote URL, if this link is not inline.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match &self.source {
            LinkSource::Remote { url } => Some(url),
            LinkSource::Inline { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_inline(&self) -> bool {
        matches!(self.source, LinkSource::Inline { .. })
    }
}
