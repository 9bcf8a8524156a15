//! Canonical search and lookup results.

use serde::{Deserialize, Serialize};

/// Ordered records returned by a search or lookup endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Provider family that answered (e.g. `"spotify"`, `"apps"`).
    pub provider: String,
    /// The query as echoed back by the provider, when it does so.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub records: Vec<ResultRecord>,
    /// Total reported by the provider, or the record count when it reports none.
    pub total: u64,
}

impl QueryResult {
    /// Build a result whose total is the number of records.
    pub fn from_records(provider: impl Into<String>, records: Vec<ResultRecord>) -> Self {
        Self {
            provider: provider.into(),
            query: None,
            total: records.len() as u64,
            records,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Iterate over the track records only.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.records.iter().filter_map(|r| match r {
            ResultRecord::Track(track) => Some(track),
            _ => None,
        })
    }

    /// Iterate over the app records only.
    pub fn apps(&self) -> impl Iterator<Item = &AppListing> {
        self.records.iter().filter_map(|r| match r {
            ResultRecord::App(app) => Some(app),
            _ => None,
        })
    }
}

/// A single record. Tagged on the wire as `{"type": "track", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResultRecord {
    Track(Track),
    App(AppListing),
    Person(LookupRecord),
    Hit(SearchHit),
    Title(CatalogueTitle),
}

/// A music track from Spotify, SoundCloud or a lyrics lookup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artists: Vec<String>,
    /// Provider page or stream URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Duration as the provider formats it (`"3:45"` or seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Full lyrics text, only for lyrics lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
}

/// Which store an app listing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AppStore {
    PlayStore,
    AppStore,
}

/// An app store listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppListing {
    pub title: String,
    pub store: AppStore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Price as displayed, `"Free"` or a currency string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Result of a people/document lookup ("consulta").
///
/// The provider's record layout differs per lookup type, so the payload is
/// kept as a JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRecord {
    /// Lookup type that produced it (`"cpf"`, `"nome"`, `"telefone"`, ...).
    pub lookup_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub data: serde_json::Value,
}

/// A web, news, video or image search hit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Channel, author or site the hit belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// A movie or series in the streaming catalogue.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueTitle {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}
