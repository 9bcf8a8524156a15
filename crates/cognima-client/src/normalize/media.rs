//! Media listings → [`MediaItem`]s.
//!
//! Each provider is described by a [`MediaRule`]; one shared routine does the
//! extraction so the "all items", "by kind" and "best only" modes can never
//! disagree on what a field means.

use cognima_core::selection::{filter_by_kind, filter_by_tier, select_best};
use cognima_core::{
    MediaItem, MediaKind, MediaListing, MediaMetadata, Resolution, ResolutionTier, RetrievalError,
    RetrievalResult,
};
use serde_json::Value;
use tracing::debug;

use super::fields::{
    first_bool, first_f64, first_rounded_u32, first_str, first_u32, first_u64, lookup, require,
};

/// How to decide an item's [`MediaKind`].
#[derive(Debug, Clone, Copy)]
pub enum KindRule {
    /// Every item in the listing has this kind.
    Fixed(MediaKind),
    /// Read from `key`; use `fallback` when the field is absent or unrecognized.
    /// Items with no usable kind and no fallback are skipped.
    Field {
        key: &'static str,
        fallback: Option<MediaKind>,
    },
}

/// Mapping table for one media listing shape.
#[derive(Debug)]
pub struct MediaRule {
    /// Dotted path to the list of renditions (a single object counts as one).
    pub items: &'static str,
    /// Dotted path to a separate provider-selected best rendition.
    pub best: Option<&'static str>,
    pub kind: KindRule,
    pub url: &'static [&'static str],
    /// Whether a rendition without a URL is malformed.
    pub url_required: bool,
    pub quality: &'static [&'static str],
    pub format: &'static [&'static str],
    /// Per-item boolean marking the provider's best rendition.
    pub best_flag: Option<&'static str>,
    /// Where the listing-level metadata lives, if the provider sends any.
    pub metadata: Option<MetadataRule>,
}

/// Location of a listing's [`MediaMetadata`].
#[derive(Debug, Clone, Copy)]
pub struct MetadataRule {
    /// Object holding title, author, duration and the like.
    pub source: &'static str,
    /// Object holding `totalItems` and the per-kind counts.
    pub counts: Option<&'static str>,
}

const SIZE_KEYS: &[&str] = &["filesize", "fileSize", "size", "filesize_approx"];
const THUMBNAIL_KEYS: &[&str] = &["thumbnail", "thumb", "cover"];
const FORMAT_ID_KEYS: &[&str] = &["formatId", "format_id"];
const AUTHOR_KEYS: &[&str] = &["uploader", "author", "author.username", "channel"];
const SOURCE_ID_KEYS: &[&str] = &["id", "tweetId", "videoId"];

/// Universal downloader: `data.media[]` with per-item `type` and `isBest`.
pub static ALLDL: MediaRule = MediaRule {
    items: "data.media",
    best: None,
    kind: KindRule::Field {
        key: "type",
        fallback: None,
    },
    url: &["url"],
    url_required: true,
    quality: &["quality"],
    format: &["format", "ext"],
    best_flag: Some("isBest"),
    metadata: Some(MetadataRule {
        source: "data.metadata",
        counts: Some("data"),
    }),
};

/// Facebook `videos[]` keyed by resolution label.
pub static FACEBOOK_VIDEOS: MediaRule = MediaRule {
    items: "videos",
    best: None,
    kind: KindRule::Fixed(MediaKind::Video),
    url: &["url"],
    url_required: true,
    quality: &["resolution", "quality"],
    format: &[],
    best_flag: None,
    metadata: None,
};

/// Facebook HD: `allQualities[]` plus the provider's pick in `video`.
pub static FACEBOOK_HD: MediaRule = MediaRule {
    items: "allQualities",
    best: Some("video"),
    kind: KindRule::Fixed(MediaKind::Video),
    url: &["url"],
    url_required: true,
    quality: &["resolution", "quality"],
    format: &[],
    best_flag: None,
    metadata: None,
};

/// yt-dlp style `formats[]` for video platforms. Items carry ids, not URLs.
pub static VIDEO_FORMATS: MediaRule = MediaRule {
    items: "formats",
    best: None,
    kind: KindRule::Fixed(MediaKind::Video),
    url: &["url"],
    url_required: false,
    quality: &["quality", "resolution"],
    format: &["ext", "format"],
    best_flag: None,
    metadata: None,
};

/// `formats[]` for audio platforms.
pub static AUDIO_FORMATS: MediaRule = MediaRule {
    items: "formats",
    best: None,
    kind: KindRule::Fixed(MediaKind::Audio),
    url: &["url"],
    url_required: false,
    quality: &["quality"],
    format: &["ext", "format"],
    best_flag: None,
    metadata: None,
};

/// `data.urls[]` quality variants (TikTok).
pub static VIDEO_URLS: MediaRule = MediaRule {
    items: "data.urls",
    best: None,
    kind: KindRule::Fixed(MediaKind::Video),
    url: &["url"],
    url_required: true,
    quality: &["quality"],
    format: &[],
    best_flag: None,
    metadata: None,
};

/// `data.urls[]` that may be pins of either kind (Pinterest).
pub static MIXED_URLS: MediaRule = MediaRule {
    items: "data.urls",
    best: None,
    kind: KindRule::Field {
        key: "type",
        fallback: Some(MediaKind::Image),
    },
    url: &["url"],
    url_required: true,
    quality: &["quality"],
    format: &[],
    best_flag: None,
    metadata: None,
};

/// Instagram posts and carousels: `data.media[]` with `type`.
pub static POST_MEDIA: MediaRule = MediaRule {
    items: "data.media",
    best: None,
    kind: KindRule::Field {
        key: "type",
        fallback: Some(MediaKind::Image),
    },
    url: &["url"],
    url_required: true,
    quality: &["quality"],
    format: &[],
    best_flag: None,
    metadata: None,
};

/// Twitter/X: `data.downloads[]` with `type` and `resolution`.
pub static TWEET_MEDIA: MediaRule = MediaRule {
    items: "data.downloads",
    best: None,
    kind: KindRule::Field {
        key: "type",
        fallback: Some(MediaKind::Video),
    },
    url: &["url"],
    url_required: true,
    quality: &["resolution", "quality"],
    format: &[],
    best_flag: None,
    metadata: Some(MetadataRule {
        source: "data",
        counts: None,
    }),
};

/// Post-extraction narrowing, shared by every media call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaOptions {
    /// Keep only this kind.
    pub kind: Option<MediaKind>,
    /// Keep only items labeled at or above this tier.
    pub min_resolution: Option<ResolutionTier>,
    /// Reduce the result to the single best item.
    pub best_only: bool,
}

impl MediaOptions {
    #[must_use]
    pub const fn all() -> Self {
        Self {
            kind: None,
            min_resolution: None,
            best_only: false,
        }
    }

    #[must_use]
    pub const fn of_kind(kind: MediaKind) -> Self {
        Self {
            kind: Some(kind),
            min_resolution: None,
            best_only: false,
        }
    }

    #[must_use]
    pub const fn best() -> Self {
        Self {
            kind: None,
            min_resolution: None,
            best_only: true,
        }
    }

    #[must_use]
    pub const fn with_min_resolution(mut self, tier: ResolutionTier) -> Self {
        self.min_resolution = Some(tier);
        self
    }
}

/// [`normalize_media`] plus the listing-level metadata described by `rule`.
///
/// Metadata is read from the raw payload, so the totals reflect the provider's
/// full listing regardless of `options`.
pub fn normalize_media_listing(
    rule: &MediaRule,
    raw: &Value,
    options: &MediaOptions,
) -> RetrievalResult<MediaListing> {
    let items = normalize_media(rule, raw, options)?;
    let metadata = rule.metadata.and_then(|meta| extract_metadata(&meta, raw));
    Ok(MediaListing { metadata, items })
}

/// Extract every rendition described by `rule`, then apply `options`.
pub fn normalize_media(
    rule: &MediaRule,
    raw: &Value,
    options: &MediaOptions,
) -> RetrievalResult<Vec<MediaItem>> {
    let listing = require(raw, rule.items)?;
    let entries: Vec<&Value> = match listing {
        Value::Array(entries) => entries.iter().collect(),
        Value::Object(_) => vec![listing],
        _ => return Err(RetrievalError::normalization(rule.items)),
    };

    let mut items = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let path = format!("{}.{index}", rule.items);
        if let Some(item) = extract_item(rule, entry, &path)? {
            items.push(item);
        }
    }

    if let Some(best_path) = rule.best {
        apply_provider_pick(rule, raw, best_path, &mut items)?;
    }
    keep_single_best(&mut items);

    if let Some(kind) = options.kind {
        items = filter_by_kind(items, kind);
    }
    if let Some(tier) = options.min_resolution {
        items = filter_by_tier(items, tier);
    }
    if options.best_only {
        items = select_best(&items).cloned().into_iter().collect();
    }
    Ok(items)
}

fn extract_item(
    rule: &MediaRule,
    entry: &Value,
    path: &str,
) -> RetrievalResult<Option<MediaItem>> {
    if !entry.is_object() {
        return Err(RetrievalError::normalization(path));
    }

    let kind = match rule.kind {
        KindRule::Fixed(kind) => kind,
        KindRule::Field { key, fallback } => {
            let parsed = first_str(entry, &[key]).and_then(|s| s.parse::<MediaKind>().ok());
            match parsed.or(fallback) {
                Some(kind) => kind,
                None => {
                    debug!(path, "Skipping media entry with unrecognized kind");
                    return Ok(None);
                }
            }
        }
    };

    let url = first_str(entry, rule.url);
    if url.is_none() && rule.url_required {
        return Err(RetrievalError::normalization(format!("{path}.url")));
    }

    let mut item = MediaItem::without_url(kind);
    item.url = url;
    item.quality = first_str(entry, rule.quality);
    item.format = first_str(entry, rule.format);
    item.size_bytes = first_u64(entry, SIZE_KEYS);
    item.format_id = first_str(entry, FORMAT_ID_KEYS);
    item.thumbnail = first_str(entry, THUMBNAIL_KEYS);
    item.is_best = rule
        .best_flag
        .and_then(|flag| first_bool(entry, &[flag]))
        .unwrap_or(false);

    match kind {
        MediaKind::Video => {
            item.resolution = resolution(entry);
            item.fps = first_f64(entry, &["fps"]);
            item.bitrate_kbps = first_rounded_u32(entry, &["vbr", "tbr", "bitrate"]);
            item.codec = codec(entry, "vcodec");
        }
        MediaKind::Audio => {
            item.bitrate_kbps = first_rounded_u32(entry, &["abr", "bitrate"]);
            item.sample_rate_hz = first_u32(entry, &["asr", "sampleRate"]);
            item.codec = codec(entry, "acodec");
        }
        MediaKind::Image => {
            item.resolution = resolution(entry);
        }
    }
    Ok(Some(item))
}

fn extract_metadata(rule: &MetadataRule, raw: &Value) -> Option<MediaMetadata> {
    let mut meta = MediaMetadata::default();
    if let Some(source) = lookup(raw, rule.source).filter(|v| v.is_object()) {
        meta.title = first_str(source, &["title"]);
        meta.platform = first_str(source, &["platform", "extractor"]);
        meta.author = first_str(source, AUTHOR_KEYS);
        meta.source_id = first_str(source, SOURCE_ID_KEYS);
        meta.duration_secs = first_f64(source, &["duration"]);
        meta.views = first_u64(source, &["views", "view_count"]);
    }
    if let Some(counts) = rule.counts.and_then(|path| lookup(raw, path)) {
        meta.total_items = first_u32(counts, &["totalItems"]);
        meta.video_count = first_u32(counts, &["videoCount"]);
        meta.audio_count = first_u32(counts, &["audioCount"]);
        meta.image_count = first_u32(counts, &["imageCount"]);
    }
    (!meta.is_empty()).then_some(meta)
}

/// Width/height fields, else a `"1920x1080"` resolution string.
fn resolution(entry: &Value) -> Option<Resolution> {
    Resolution::from_parts(first_u32(entry, &["width"]), first_u32(entry, &["height"])).or_else(
        || first_str(entry, &["resolution"]).and_then(|s| Resolution::parse_dimensions(&s)),
    )
}

/// yt-dlp reports a missing codec as the literal `"none"`.
fn codec(entry: &Value, key: &str) -> Option<String> {
    first_str(entry, &[key]).filter(|c| !c.eq_ignore_ascii_case("none"))
}

/// Flag the rendition the provider returned separately as its pick.
fn apply_provider_pick(
    rule: &MediaRule,
    raw: &Value,
    best_path: &str,
    items: &mut Vec<MediaItem>,
) -> RetrievalResult<()> {
    let Some(pick) = lookup(raw, best_path) else {
        return Ok(());
    };
    let Some(mut picked) = extract_item(rule, pick, best_path)? else {
        return Ok(());
    };

    for item in items.iter_mut() {
        item.is_best = false;
    }
    match items.iter_mut().find(|item| item.url == picked.url) {
        Some(existing) => existing.is_best = true,
        None => {
            picked.is_best = true;
            items.insert(0, picked);
        }
    }
    Ok(())
}

/// At most one item per response may carry the best flag; the first wins.
fn keep_single_best(items: &mut [MediaItem]) {
    let mut seen = false;
    for item in items {
        if item.is_best {
            item.is_best = !seen;
            seen = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn alldl_payload() -> Value {
        json!({
            "success": true,
            "data": {
                "metadata": {"title": "Clip", "platform": "youtube"},
                "media": [
                    {"type": "video", "url": "v720", "quality": "720p", "format": "mp4",
                     "width": 1280, "height": 720, "fps": 30, "vcodec": "avc1", "acodec": "none",
                     "filesize": 1048576, "isBest": false},
                    {"type": "video", "url": "v1080", "quality": "1080p", "format": "mp4",
                     "resolution": "1920x1080", "isBest": true},
                    {"type": "audio", "url": "a", "quality": "128kbps", "format": "m4a",
                     "abr": 128, "asr": 44100, "acodec": "mp4a.40.2", "vcodec": "none"},
                    {"type": "image", "url": "thumb", "width": 480, "height": 360}
                ]
            }
        })
    }

    #[test]
    fn test_alldl_extracts_kind_specific_fields() {
        let items = normalize_media(&ALLDL, &alldl_payload(), &MediaOptions::all()).unwrap();
        assert_eq!(items.len(), 4);

        let v720 = &items[0];
        assert_eq!(v720.kind, MediaKind::Video);
        assert_eq!(v720.resolution, Some(Resolution::new(1280, 720)));
        assert_eq!(v720.fps, Some(30.0));
        assert_eq!(v720.codec.as_deref(), Some("avc1"));
        assert_eq!(v720.size_bytes, Some(1_048_576));
        assert_eq!(v720.sample_rate_hz, None);

        assert_eq!(items[1].resolution, Some(Resolution::new(1920, 1080)));
        assert!(items[1].is_best);

        let audio = &items[2];
        assert_eq!(audio.bitrate_kbps, Some(128));
        assert_eq!(audio.sample_rate_hz, Some(44_100));
        assert_eq!(audio.codec.as_deref(), Some("mp4a.40.2"));
        assert_eq!(audio.resolution, None);

        assert_eq!(items[3].kind, MediaKind::Image);
        assert_eq!(items[3].fps, None);
    }

    #[test]
    fn test_modes_share_extraction() {
        let raw = alldl_payload();
        let all = normalize_media(&ALLDL, &raw, &MediaOptions::all()).unwrap();
        let audio_only = MediaOptions::of_kind(MediaKind::Audio);
        let audio = normalize_media(&ALLDL, &raw, &audio_only).unwrap();
        let best = normalize_media(&ALLDL, &raw, &MediaOptions::best()).unwrap();

        assert_eq!(audio, vec![all[2].clone()]);
        assert_eq!(best, vec![all[1].clone()]);
    }

    #[test]
    fn test_min_resolution_option() {
        let options =
            MediaOptions::of_kind(MediaKind::Video).with_min_resolution(ResolutionTier::P1080);
        let items = normalize_media(&ALLDL, &alldl_payload(), &options).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url.as_deref(), Some("v1080"));
    }

    #[test]
    fn test_only_first_best_flag_survives() {
        let raw = json!({"data": {"media": [
            {"type": "video", "url": "a", "isBest": true},
            {"type": "video", "url": "b", "isBest": true}
        ]}});
        let items = normalize_media(&ALLDL, &raw, &MediaOptions::all()).unwrap();
        assert!(items[0].is_best);
        assert!(!items[1].is_best);
    }

    #[test]
    fn test_facebook_video_list() {
        let raw = json!({"success": true, "videos": [
            {"resolution": "480p", "url": "a", "thumbnail": "t", "shouldRender": false},
            {"resolution": "1080p", "url": "b"}
        ]});
        let items = normalize_media(&FACEBOOK_VIDEOS, &raw, &MediaOptions::all()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quality.as_deref(), Some("480p"));
        assert_eq!(items[0].thumbnail.as_deref(), Some("t"));
        let best = select_best(&items).unwrap();
        assert_eq!(best.url.as_deref(), Some("b"));
    }

    #[test]
    fn test_facebook_hd_marks_provider_pick() {
        let raw = json!({
            "success": true,
            "video": {"url": "hd", "resolution": "720p"},
            "allQualities": [
                {"url": "sd", "resolution": "360p"},
                {"url": "hd", "resolution": "720p"}
            ]
        });
        let items = normalize_media(&FACEBOOK_HD, &raw, &MediaOptions::all()).unwrap();
        assert_eq!(items.len(), 2);
        assert!(!items[0].is_best);
        assert!(items[1].is_best);
    }

    #[test]
    fn test_facebook_hd_pick_missing_from_list_is_prepended() {
        let raw = json!({
            "video": {"url": "only-hd", "resolution": "1080p"},
            "allQualities": [{"url": "sd", "resolution": "360p"}]
        });
        let items = normalize_media(&FACEBOOK_HD, &raw, &MediaOptions::all()).unwrap();
        assert_eq!(items[0].url.as_deref(), Some("only-hd"));
        assert!(items[0].is_best);
        assert_eq!(items.iter().filter(|i| i.is_best).count(), 1);
    }

    #[test]
    fn test_formats_without_urls() {
        let raw = json!({"success": true, "formats": [
            {"formatId": "160p30", "quality": "160p", "ext": "mp4", "filesize": 1000},
            {"formatId": "1080p60", "quality": "1080p60", "ext": "mp4",
             "width": 1920, "height": 1080}
        ]});
        let items = normalize_media(&VIDEO_FORMATS, &raw, &MediaOptions::best()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].format_id.as_deref(), Some("1080p60"));
        assert!(items[0].url.is_none());
    }

    #[test]
    fn test_missing_url_is_normalization_error() {
        let raw = json!({"videos": [{"resolution": "720p"}]});
        let err = normalize_media(&FACEBOOK_VIDEOS, &raw, &MediaOptions::all()).unwrap_err();
        assert_eq!(err, RetrievalError::normalization("videos.0.url"));
    }

    #[test]
    fn test_missing_listing_and_empty_listing() {
        let all = MediaOptions::all();
        let err = normalize_media(&TWEET_MEDIA, &json!({"data": {}}), &all).unwrap_err();
        assert_eq!(err, RetrievalError::normalization("data.downloads"));

        let empty = normalize_media(&VIDEO_URLS, &json!({"data": {"urls": []}}), &all).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_kind_fallback_and_skip() {
        let raw = json!({"data": {"media": [
            {"type": "video", "url": "v"},
            {"url": "no-type"},
            {"type": "sticker", "url": "s"}
        ]}});
        let post = normalize_media(&POST_MEDIA, &raw, &MediaOptions::all()).unwrap();
        assert_eq!(
            post.iter().map(|i| i.kind).collect::<Vec<_>>(),
            vec![MediaKind::Video, MediaKind::Image, MediaKind::Image]
        );

        let strict = normalize_media(&ALLDL, &raw, &MediaOptions::all()).unwrap();
        assert_eq!(strict.len(), 1);
    }

    #[test]
    fn test_absent_fields_stay_absent() {
        let raw = json!({"data": {"urls": [{"url": "x"}]}});
        let items = normalize_media(&VIDEO_URLS, &raw, &MediaOptions::all()).unwrap();
        let item = &items[0];
        assert!(item.quality.is_none());
        assert!(item.size_bytes.is_none());
        assert!(item.resolution.is_none());
        assert!(!item.is_best);
    }

    #[test]
    fn test_fractional_bitrates_rank_audio() {
        let raw = json!({"data": {"media": [
            {"type": "audio", "url": "low", "abr": 48.9},
            {"type": "audio", "url": "high", "abr": 129.478},
            {"type": "video", "url": "v", "tbr": 2481.562}
        ]}});
        let items = normalize_media(&ALLDL, &raw, &MediaOptions::all()).unwrap();
        let bitrates: Vec<Option<u32>> = items.iter().map(|i| i.bitrate_kbps).collect();
        assert_eq!(bitrates, vec![Some(49), Some(129), Some(2482)]);

        let audio = MediaOptions::of_kind(MediaKind::Audio);
        let best = normalize_media(&ALLDL, &raw, &audio).unwrap();
        assert_eq!(select_best(&best).and_then(|i| i.url.as_deref()), Some("high"));
    }

    fn tweet_payload() -> Value {
        json!({"success": true, "data": {
            "tweetId": "1234567890123456789",
            "author": "someone",
            "type": "video",
            "downloads": [
                {"type": "video", "resolution": "640x360", "url": "sd"},
                {"type": "video", "resolution": "1280x720", "url": "hd"}
            ]
        }})
    }

    #[test]
    fn test_tweet_dimension_labels_pass_minimum_resolution() {
        let items =
            normalize_media(&TWEET_MEDIA, &tweet_payload(), &MediaOptions::all()).unwrap();
        assert_eq!(items[1].resolution, Some(Resolution::new(1280, 720)));
        assert_eq!(items[1].quality.as_deref(), Some("1280x720"));

        let options = MediaOptions::all().with_min_resolution(ResolutionTier::P720);
        let kept = normalize_media(&TWEET_MEDIA, &tweet_payload(), &options).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url.as_deref(), Some("hd"));

        let best =
            normalize_media(&TWEET_MEDIA, &tweet_payload(), &MediaOptions::best()).unwrap();
        assert_eq!(best[0].url.as_deref(), Some("hd"));
    }

    #[test]
    fn test_normalizing_twice_is_identical() {
        let raw = alldl_payload();
        let first = normalize_media_listing(&ALLDL, &raw, &MediaOptions::all()).unwrap();
        let second = normalize_media_listing(&ALLDL, &raw, &MediaOptions::all()).unwrap();
        assert_eq!(first, second);

        let tweet = tweet_payload();
        assert_eq!(
            normalize_media(&TWEET_MEDIA, &tweet, &MediaOptions::best()).unwrap(),
            normalize_media(&TWEET_MEDIA, &tweet, &MediaOptions::best()).unwrap()
        );
    }

    #[test]
    fn test_alldl_listing_carries_metadata_and_totals() {
        let mut raw = alldl_payload();
        raw["data"]["metadata"]["duration"] = json!(212.5);
        raw["data"]["metadata"]["uploader"] = json!("Channel");
        raw["data"]["totalItems"] = json!(4);
        raw["data"]["videoCount"] = json!(2);
        raw["data"]["audioCount"] = json!(1);
        raw["data"]["imageCount"] = json!(1);

        let options = MediaOptions::of_kind(MediaKind::Audio);
        let listing = normalize_media_listing(&ALLDL, &raw, &options).unwrap();
        assert_eq!(listing.items.len(), 1);

        let meta = listing.metadata.unwrap();
        assert_eq!(meta.title.as_deref(), Some("Clip"));
        assert_eq!(meta.platform.as_deref(), Some("youtube"));
        assert_eq!(meta.author.as_deref(), Some("Channel"));
        assert_eq!(meta.duration_secs, Some(212.5));
        assert_eq!(meta.views, None);
        // Totals describe the provider listing, not the filtered items.
        assert_eq!(meta.total_items, Some(4));
        assert_eq!(meta.video_count, Some(2));
        assert_eq!(meta.image_count, Some(1));
    }

    #[test]
    fn test_tweet_listing_metadata() {
        let listing =
            normalize_media_listing(&TWEET_MEDIA, &tweet_payload(), &MediaOptions::all()).unwrap();
        let meta = listing.metadata.unwrap();
        assert_eq!(meta.source_id.as_deref(), Some("1234567890123456789"));
        assert_eq!(meta.author.as_deref(), Some("someone"));
        assert_eq!(meta.total_items, None);
    }

    #[test]
    fn test_listing_without_metadata() {
        let raw = json!({"videos": [{"resolution": "720p", "url": "a"}]});
        let listing =
            normalize_media_listing(&FACEBOOK_VIDEOS, &raw, &MediaOptions::all()).unwrap();
        assert!(listing.metadata.is_none());
        assert_eq!(listing.items.len(), 1);

        let bare = json!({"data": {"media": []}});
        let listing = normalize_media_listing(&ALLDL, &bare, &MediaOptions::all()).unwrap();
        assert!(listing.metadata.is_none());
    }
}
