//! Response normalization.
//!
//! Each endpoint descriptor names a [`Profile`], a `'static` mapping table
//! from one provider payload shape to a canonical entity. The functions here
//! check the provider envelope, then dispatch on the profile.
//!
//! Missing mandatory fields surface as [`RetrievalError::Normalization`]
//! naming the field; missing optional fields stay `None`.

mod document;
mod fields;
mod link;
mod media;
mod query;

pub use document::{COMPLETION, DATA, DocumentRule, INFO, WHOLE, normalize_document};
pub use link::{
    CONVERSION, DATA_DOWNLOAD, GENERATED_IMAGE, IMAGE_RESULT, LinkRule, SEARCH_DOWNLOAD,
    normalize_link,
};
pub use media::{
    ALLDL, AUDIO_FORMATS, FACEBOOK_HD, FACEBOOK_VIDEOS, KindRule, MIXED_URLS, MediaOptions,
    MediaRule, MetadataRule, POST_MEDIA, TWEET_MEDIA, VIDEO_FORMATS, VIDEO_URLS, normalize_media,
    normalize_media_listing,
};
pub use query::{
    APPS_SEARCH, APPSTORE, CATALOGUE, CONSULTA, LYRICS, PINTEREST_SEARCH, PLAYSTORE, QueryRule,
    RecordKind, RecordSource, SOUNDCLOUD_ONE, SOUNDCLOUD_SEARCH, SPOTIFY_ONE, SPOTIFY_SEARCH,
    TIKTOK_SEARCH, WEB_SEARCH, YOUTUBE_SEARCH, normalize_query,
};

use cognima_core::{
    DownloadLink, MediaItem, MediaListing, QueryResult, RetrievalError, RetrievalResult,
};
use serde_json::Value;

use crate::endpoint::{EndpointDescriptor, Profile};

/// A payload mapped through its endpoint's profile.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Media(MediaListing),
    Query(QueryResult),
    Link(DownloadLink),
    Document(Value),
}

/// Reject `{ "success": false, ... }` envelopes delivered with a 2xx status.
pub fn check_envelope(raw: &Value) -> RetrievalResult<()> {
    if fields::first_bool(raw, &["success"]) == Some(false) {
        let message = fields::first_str(raw, &["message", "error", "msg"])
            .unwrap_or_else(|| "provider reported failure".to_string());
        return Err(RetrievalError::provider(message));
    }
    Ok(())
}

/// Map `raw` through `descriptor`'s profile. `options` only affects media profiles.
pub fn normalize(
    descriptor: &EndpointDescriptor,
    raw: &Value,
    options: &MediaOptions,
) -> RetrievalResult<Normalized> {
    check_envelope(raw)?;
    match descriptor.profile {
        Profile::Media(rule) => normalize_media_listing(rule, raw, options).map(Normalized::Media),
        Profile::Query(rule) => normalize_query(rule, raw).map(Normalized::Query),
        Profile::Link(rule) => normalize_link(rule, descriptor.provider, raw).map(Normalized::Link),
        Profile::Document(rule) => normalize_document(rule, raw).map(Normalized::Document),
        Profile::Stream => Err(RetrievalError::configuration(
            descriptor.name,
            "binary endpoint has no JSON payload; use the streaming downloader",
        )),
    }
}

impl Normalized {
    /// Short name of the entity type, for logs and mismatch errors.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Media(_) => "media",
            Self::Query(_) => "query",
            Self::Link(_) => "link",
            Self::Document(_) => "document",
        }
    }

    pub fn into_media(self) -> RetrievalResult<Vec<MediaItem>> {
        self.into_media_listing().map(|listing| listing.items)
    }

    pub fn into_media_listing(self) -> RetrievalResult<MediaListing> {
        match self {
            Self::Media(listing) => Ok(listing),
            other => Err(other.mismatch("media")),
        }
    }

    pub fn into_query(self) -> RetrievalResult<QueryResult> {
        match self {
            Self::Query(result) => Ok(result),
            other => Err(other.mismatch("query")),
        }
    }

    pub fn into_link(self) -> RetrievalResult<DownloadLink> {
        match self {
            Self::Link(link) => Ok(link),
            other => Err(other.mismatch("link")),
        }
    }

    pub fn into_document(self) -> RetrievalResult<Value> {
        match self {
            Self::Document(value) => Ok(value),
            other => Err(other.mismatch("document")),
        }
    }

    fn mismatch(&self, expected: &str) -> RetrievalError {
        RetrievalError::configuration(
            "profile",
            format!("expected a {expected} endpoint, got {}", self.label()),
        )
    }
}
