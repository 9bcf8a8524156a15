//! Single-file download payloads → [`DownloadLink`].

use cognima_core::{DownloadLink, LinkSource, RetrievalError, RetrievalResult};
use serde_json::Value;

use super::fields::{first_str, first_u64, require, string_list};

/// Mapping table for one download-link shape.
#[derive(Debug)]
pub struct LinkRule {
    /// Object holding the link, relative to the payload root.
    pub root: &'static str,
    /// Candidate URL keys below `root`, in priority order.
    pub url: &'static [&'static str],
    /// Keys holding base64 file content delivered inline.
    pub inline: &'static [&'static str],
    /// Object holding title/artist metadata when it is not `root`.
    pub meta: Option<&'static str>,
}

const TITLE_KEYS: &[&str] = &["title", "name", "fileName", "filename"];
const FILE_NAME_KEYS: &[&str] = &["fileName", "filename", "file_name"];
const MIME_KEYS: &[&str] = &["mimetype", "mimeType", "contentType"];
const SIZE_KEYS: &[&str] = &["fileSize", "filesize", "size"];
const ARTIST_KEYS: &[&str] = &["artists", "artist", "author", "user.username"];
const THUMBNAIL_KEYS: &[&str] = &["thumbnail", "albumImage", "cover", "image"];

/// `data.downloadUrl` payloads of the video hosts, Reddit and Likee.
pub static DATA_DOWNLOAD: LinkRule = LinkRule {
    root: "data",
    url: &["downloadUrl", "url", "download"],
    inline: &[],
    meta: None,
};

/// Spotify and SoundCloud search-then-download: link in `download`, tags in `track`.
pub static SEARCH_DOWNLOAD: LinkRule = LinkRule {
    root: "download",
    url: &["downloadUrl", "url", "data.downloadUrl"],
    inline: &[],
    meta: Some("track"),
};

/// YouTube conversions answer with either a URL or the whole file as base64.
pub static CONVERSION: LinkRule = LinkRule {
    root: "data",
    url: &["downloadUrl", "url", "download"],
    inline: &["buffer", "base64"],
    meta: None,
};

/// Generated images: `data.data[0].url`.
pub static GENERATED_IMAGE: LinkRule = LinkRule {
    root: "data",
    url: &["data.0.url", "url"],
    inline: &["data.0.b64_json"],
    meta: None,
};

/// Image tools: `result.download`.
pub static IMAGE_RESULT: LinkRule = LinkRule {
    root: "result",
    url: &["download", "url"],
    inline: &[],
    meta: None,
};

/// Build a [`DownloadLink`] for `provider` from `raw`.
pub fn normalize_link(
    rule: &LinkRule,
    provider: &str,
    raw: &Value,
) -> RetrievalResult<DownloadLink> {
    let root = require(raw, rule.root)?;

    let source = if let Some(url) = first_str(root, rule.url) {
        LinkSource::Remote { url }
    } else if let Some(base64) = first_str(root, rule.inline) {
        LinkSource::Inline { base64 }
    } else {
        let key = rule.url.first().copied().unwrap_or_default();
        return Err(RetrievalError::normalization(join(rule.root, key)));
    };

    let meta = match rule.meta {
        Some(path) => require(raw, path)?,
        None => root,
    };

    let size_bytes = first_u64(root, SIZE_KEYS);
    Ok(DownloadLink {
        provider: provider.to_string(),
        source,
        title: first_str(meta, TITLE_KEYS),
        file_name: first_str(root, FILE_NAME_KEYS),
        mime_type: first_str(root, MIME_KEYS),
        size_bytes,
        size_label: size_bytes.map_or_else(|| first_str(root, SIZE_KEYS), |_| None),
        artists: string_list(meta, ARTIST_KEYS),
        duration: first_str(meta, &["duration"]),
        thumbnail: first_str(meta, THUMBNAIL_KEYS),
    })
}

fn join(root: &str, key: &str) -> String {
    if root.is_empty() {
        key.to_string()
    } else {
        format!("{root}.{key}")
    }
}
