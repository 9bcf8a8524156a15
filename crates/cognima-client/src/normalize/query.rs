//! Search and lookup payloads → [`QueryResult`].

use cognima_core::{
    AppListing, AppStore, CatalogueTitle, LookupRecord, QueryResult, ResultRecord,
    RetrievalError, RetrievalResult, SearchHit, Track,
};
use serde_json::Value;

use super::fields::{first_f64, first_str, first_u64, lookup, string_list};

/// Which record type a source list holds.
#[derive(Debug, Clone, Copy)]
pub enum RecordKind {
    Track,
    App(AppStore),
    Person,
    Hit,
    Title,
}

/// One list (or single object) of records inside a payload.
#[derive(Debug)]
pub struct RecordSource {
    pub path: &'static str,
    pub kind: RecordKind,
    /// A missing required source is a normalization error; an optional one is skipped.
    pub required: bool,
}

/// Mapping table for one search/lookup shape.
#[derive(Debug)]
pub struct QueryRule {
    pub provider: &'static str,
    pub sources: &'static [RecordSource],
    pub query_echo: &'static [&'static str],
    pub total: &'static [&'static str],
}

const fn source(path: &'static str, kind: RecordKind) -> RecordSource {
    RecordSource {
        path,
        kind,
        required: true,
    }
}

pub static SPOTIFY_SEARCH: QueryRule = QueryRule {
    provider: "spotify",
    sources: &[source("results", RecordKind::Track)],
    query_echo: &["query"],
    total: &["total"],
};

pub static SPOTIFY_ONE: QueryRule = QueryRule {
    provider: "spotify",
    sources: &[source("result", RecordKind::Track)],
    query_echo: &["query"],
    total: &[],
};

pub static SOUNDCLOUD_SEARCH: QueryRule = QueryRule {
    provider: "soundcloud",
    sources: &[source("results", RecordKind::Track)],
    query_echo: &["query"],
    total: &["total"],
};

pub static SOUNDCLOUD_ONE: QueryRule = QueryRule {
    provider: "soundcloud",
    sources: &[source("result", RecordKind::Track)],
    query_echo: &["query"],
    total: &[],
};

pub static LYRICS: QueryRule = QueryRule {
    provider: "lyrics",
    sources: &[source("data", RecordKind::Track)],
    query_echo: &[],
    total: &[],
};

pub static YOUTUBE_SEARCH: QueryRule = QueryRule {
    provider: "youtube",
    sources: &[source("data.results", RecordKind::Hit)],
    query_echo: &["data.query"],
    total: &["data.count"],
};

pub static TIKTOK_SEARCH: QueryRule = QueryRule {
    provider: "tiktok",
    sources: &[source("data.results", RecordKind::Hit)],
    query_echo: &["data.query"],
    total: &["data.count"],
};

pub static PINTEREST_SEARCH: QueryRule = QueryRule {
    provider: "pinterest",
    sources: &[source("data.results", RecordKind::Hit)],
    query_echo: &["data.query"],
    total: &["data.count"],
};

pub static WEB_SEARCH: QueryRule = QueryRule {
    provider: "search",
    sources: &[source("data.results", RecordKind::Hit)],
    query_echo: &["data.query"],
    total: &["data.totalResults"],
};

pub static APPS_SEARCH: QueryRule = QueryRule {
    provider: "apps",
    sources: &[
        RecordSource {
            path: "data.playStore",
            kind: RecordKind::App(AppStore::PlayStore),
            required: false,
        },
        RecordSource {
            path: "data.appStore",
            kind: RecordKind::App(AppStore::AppStore),
            required: false,
        },
    ],
    query_echo: &["data.query"],
    total: &[],
};

pub static PLAYSTORE: QueryRule = QueryRule {
    provider: "apps",
    sources: &[source("data.results", RecordKind::App(AppStore::PlayStore))],
    query_echo: &["data.query"],
    total: &[],
};

pub static APPSTORE: QueryRule = QueryRule {
    provider: "apps",
    sources: &[source("data.results", RecordKind::App(AppStore::AppStore))],
    query_echo: &["data.query"],
    total: &[],
};

pub static CONSULTA: QueryRule = QueryRule {
    provider: "consulta",
    sources: &[source("data", RecordKind::Person)],
    query_echo: &["data.query"],
    total: &[],
};

pub static CATALOGUE: QueryRule = QueryRule {
    provider: "catalogue",
    sources: &[source("data", RecordKind::Title)],
    query_echo: &[],
    total: &[],
};

/// Collect the records described by `rule`, in source order.
pub fn normalize_query(rule: &QueryRule, raw: &Value) -> RetrievalResult<QueryResult> {
    let mut records = Vec::new();
    let mut found_any = false;

    for source in rule.sources {
        let Some(listing) = lookup(raw, source.path) else {
            if source.required {
                return Err(RetrievalError::normalization(source.path));
            }
            continue;
        };
        found_any = true;

        let entries: Vec<&Value> = match listing {
            Value::Array(entries) => entries.iter().collect(),
            Value::Object(_) => vec![listing],
            _ => return Err(RetrievalError::normalization(source.path)),
        };
        for (index, entry) in entries.into_iter().enumerate() {
            let path = format!("{}.{index}", source.path);
            records.push(extract_record(source.kind, entry, &path)?);
        }
    }

    if !found_any {
        let first = rule.sources.first().map_or("data", |s| s.path);
        return Err(RetrievalError::normalization(first));
    }

    let total = first_u64(raw, rule.total).unwrap_or(records.len() as u64);
    Ok(QueryResult {
        provider: rule.provider.to_string(),
        query: first_str(raw, rule.query_echo),
        records,
        total,
    })
}

fn extract_record(kind: RecordKind, entry: &Value, path: &str) -> RetrievalResult<ResultRecord> {
    if !entry.is_object() {
        return Err(RetrievalError::normalization(path));
    }
    let title = |keys: &[&str]| {
        first_str(entry, keys)
            .ok_or_else(|| RetrievalError::normalization(format!("{path}.{}", keys[0])))
    };

    Ok(match kind {
        RecordKind::Track => ResultRecord::Track(Track {
            title: title(&["title", "name"])?,
            artists: string_list(entry, &["artists", "artist", "user.username"]),
            url: first_str(entry, &["link", "permalink_url", "url"]),
            duration: first_str(entry, &["duration"]),
            album: first_str(entry, &["album"]),
            year: first_str(entry, &["year"]),
            genre: first_str(entry, &["genre"]),
            play_count: first_u64(entry, &["playback_count", "plays"]),
            like_count: first_u64(entry, &["likes_count", "likes"]),
            thumbnail: first_str(entry, &["thumbnail", "albumImage", "artwork_url"]),
            lyrics: first_str(entry, &["lyrics"]),
        }),
        RecordKind::App(store) => ResultRecord::App(AppListing {
            title: title(&["title", "name"])?,
            store,
            app_id: first_str(entry, &["appId", "id"]),
            developer: first_str(entry, &["developer"]),
            score: first_f64(entry, &["score"]),
            price: first_str(entry, &["priceText", "price"]),
            summary: first_str(entry, &["summary", "description"]),
            url: first_str(entry, &["url"]),
        }),
        RecordKind::Person => ResultRecord::Person(LookupRecord {
            lookup_type: title(&["type"])?,
            timestamp: first_str(entry, &["timestamp"]),
            data: lookup(entry, "resultado")
                .cloned()
                .ok_or_else(|| RetrievalError::normalization(format!("{path}.resultado")))?,
        }),
        RecordKind::Hit => ResultRecord::Hit(SearchHit {
            title: title(&["title", "desc", "description"])?,
            url: first_str(entry, &["url", "link"])
                .ok_or_else(|| RetrievalError::normalization(format!("{path}.url")))?,
            description: first_str(entry, &["description", "snippet", "body"]),
            source: first_str(entry, &["channel.name", "author.username", "author", "source"]),
            views: first_u64(entry, &["views", "stats.views"]),
            thumbnail: first_str(entry, &["thumbnail", "image", "cover"]),
        }),
        RecordKind::Title => ResultRecord::Title(CatalogueTitle {
            id: title(&["stream_id", "series_id", "id"])?,
            name: title(&["name", "title"])?,
            year: first_str(entry, &["year", "releaseDate"]),
            rating: first_f64(entry, &["rating"]),
            category: first_str(entry, &["category_id", "category_name"]),
            cover: first_str(entry, &["stream_icon", "cover"]),
        }),
    })
}
