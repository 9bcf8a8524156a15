//! Canonical media entities.
//!
//! Pure data types with no I/O dependencies. Every provider's video, audio
//! and image listings are normalized into [`MediaItem`]s.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RetrievalError;

/// What a media item contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

impl MediaKind {
    /// All kinds, in selection preference order.
    pub const ALL: [Self; 3] = [Self::Video, Self::Audio, Self::Image];

    /// Get the lowercase name used by providers and in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Image => "image",
        }
    }

    /// Preference when a candidate list mixes kinds. Higher wins.
    pub(crate) const fn preference(self) -> u8 {
        match self {
            Self::Video => 2,
            Self::Audio => 1,
            Self::Image => 0,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = RetrievalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" | "mp4" | "webm" | "gif" => Ok(Self::Video),
            "audio" | "mp3" | "m4a" => Ok(Self::Audio),
            "image" | "photo" | "jpg" | "jpeg" | "png" | "webp" => Ok(Self::Image),
            other => Err(RetrievalError::configuration(
                "kind",
                format!("unknown media kind '{other}'"),
            )),
        }
    }
}

/// Pixel dimensions. Width and height are always known together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Build from optional dimensions, yielding `None` unless both are present.
    #[must_use]
    pub const fn from_parts(width: Option<u32>, height: Option<u32>) -> Option<Self> {
        match (width, height) {
            (Some(width), Some(height)) => Some(Self { width, height }),
            _ => None,
        }
    }

    /// Parse a `"1920x1080"` style string.
    #[must_use]
    pub fn parse_dimensions(s: &str) -> Option<Self> {
        let (w, h) = s.trim().split_once(['x', 'X'])?;
        Some(Self::new(w.trim().parse().ok()?, h.trim().parse().ok()?))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One downloadable rendition of a piece of media.
///
/// Optional fields are `None` when the provider did not report them; they
/// are never filled with placeholder values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub kind: MediaKind,
    /// Source URL of this rendition. Format listings identify renditions by
    /// `format_id` instead and leave this absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Provider quality label such as `"1080p"`, `"HD"` or `"128kbps"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// Container or file extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    /// Audio bitrate in kbps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate_kbps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate_hz: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Provider-specific format identifier (yt-dlp style `formatId`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Set when the provider marked this rendition as its best.
    #[serde(default)]
    pub is_best: bool,
}

impl MediaItem {
    /// Create an item with only kind and URL known.
    pub fn new(kind: MediaKind, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::without_url(kind)
        }
    }

    /// Create an item that has no direct URL, only a provider format id.
    #[must_use]
    pub const fn without_url(kind: MediaKind) -> Self {
        Self {
            kind,
            url: None,
            quality: None,
            format: None,
            resolution: None,
            fps: None,
            bitrate_kbps: None,
            sample_rate_hz: None,
            codec: None,
            size_bytes: None,
            format_id: None,
            thumbnail: None,
            is_best: false,
        }
    }

    #[must_use]
    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    #[must_use]
    pub const fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    #[must_use]
    pub const fn with_bitrate(mut self, kbps: u32) -> Self {
        self.bitrate_kbps = Some(kbps);
        self
    }

    #[must_use]
    pub const fn with_size(mut self, bytes: u64) -> Self {
        self.size_bytes = Some(bytes);
        self
    }

    #[must_use]
    pub const fn with_best(mut self, is_best: bool) -> Self {
        self.is_best = is_best;
        self
    }

    /// Vertical resolution this item advertises, used for ranking.
    ///
    /// Taken from the quality label (`"1080p"` → 1080, `"1280x720"` → 720,
    /// `"HD 720"` → 720), falling back to the structured resolution height.
    #[must_use]
    pub fn vertical_resolution(&self) -> Option<u32> {
        self.quality
            .as_deref()
            .and_then(|label| label_height(label).or_else(|| first_integer(label)))
            .or_else(|| self.resolution.map(|r| r.height))
    }

    /// Height used for minimum-resolution filtering.
    ///
    /// A `<N>p` token (`"720p60"` → 720) or a `WxH` label (`"1280x720"` → 720)
    /// wins; otherwise the structured resolution height. Bare numbers and
    /// labels like `"HD"` are not trusted on their own.
    #[must_use]
    pub fn advertised_height(&self) -> Option<u32> {
        self.quality
            .as_deref()
            .and_then(label_height)
            .or_else(|| self.resolution.map(|r| r.height))
    }
}

/// Height spelled out by a quality label, as `<N>p` or `WxH`.
pub(crate) fn label_height(label: &str) -> Option<u32> {
    p_token(label).or_else(|| Resolution::parse_dimensions(label).map(|r| r.height))
}

/// Facts about the source a listing came from, as reported by the provider.
///
/// Every field is optional; providers report different subsets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Uploader or author handle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Provider identifier of the source post or video, e.g. a tweet id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    /// Provider-reported totals. These describe the full listing, before any filtering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_count: Option<u32>,
}

impl MediaMetadata {
    /// True when the provider reported none of the fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The renditions of one source together with its metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaListing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MediaMetadata>,
    pub items: Vec<MediaItem>,
}

impl MediaListing {
    #[must_use]
    pub const fn new(items: Vec<MediaItem>) -> Self {
        Self {
            metadata: None,
            items,
        }
    }
}

/// First run of ASCII digits in `s`.
pub(crate) fn first_integer(s: &str) -> Option<u32> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let digits: String = s[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Number immediately followed by `p`/`P`, e.g. `"1080p"` or `"HD (720p)"`.
pub(crate) fn p_token(s: &str) -> Option<u32> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i < bytes.len() && bytes[i].eq_ignore_ascii_case(&b'p') {
                return s[start..i].parse().ok();
            }
        } else {
            i += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Video".parse::<MediaKind>().unwrap(), MediaKind::Video);
        assert_eq!("mp3".parse::<MediaKind>().unwrap(), MediaKind::Audio);
        assert_eq!("photo".parse::<MediaKind>().unwrap(), MediaKind::Image);
        assert!("hologram".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_resolution_requires_both_parts() {
        assert_eq!(
            Resolution::from_parts(Some(1280), Some(720)),
            Some(Resolution::new(1280, 720))
        );
        assert_eq!(Resolution::from_parts(Some(1280), None), None);
        assert_eq!(Resolution::from_parts(None, Some(720)), None);
    }

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(
            Resolution::parse_dimensions("1920x1080"),
            Some(Resolution::new(1920, 1080))
        );
        assert_eq!(Resolution::parse_dimensions("HD"), None);
    }

    #[test]
    fn test_vertical_resolution_prefers_label() {
        let item = MediaItem::new(MediaKind::Video, "u")
            .with_quality("720p")
            .with_resolution(Resolution::new(1920, 1080));
        assert_eq!(item.vertical_resolution(), Some(720));

        let unlabeled =
            MediaItem::new(MediaKind::Video, "u").with_resolution(Resolution::new(640, 360));
        assert_eq!(unlabeled.vertical_resolution(), Some(360));

        let hd = MediaItem::new(MediaKind::Video, "u").with_quality("HD");
        assert_eq!(hd.vertical_resolution(), None);
    }

    #[test]
    fn test_dimension_labels_report_height() {
        let item = MediaItem::new(MediaKind::Video, "u").with_quality("1280x720");
        assert_eq!(item.vertical_resolution(), Some(720));
        assert_eq!(item.advertised_height(), Some(720));
    }

    #[test]
    fn test_advertised_height_falls_back_to_dimensions() {
        let hd = MediaItem::new(MediaKind::Video, "u")
            .with_quality("HD")
            .with_resolution(Resolution::new(1920, 1080));
        assert_eq!(hd.advertised_height(), Some(1080));

        let labeled = MediaItem::new(MediaKind::Video, "u")
            .with_quality("480p")
            .with_resolution(Resolution::new(1920, 1080));
        assert_eq!(labeled.advertised_height(), Some(480));

        let bare = MediaItem::new(MediaKind::Video, "u").with_quality("720");
        assert_eq!(bare.advertised_height(), None);
        assert_eq!(MediaItem::new(MediaKind::Video, "u").advertised_height(), None);
    }

    #[test]
    fn test_p_token() {
        assert_eq!(p_token("1080p"), Some(1080));
        assert_eq!(p_token("720p60"), Some(720));
        assert_eq!(p_token("HD (480P)"), Some(480));
        assert_eq!(p_token("128kbps"), None);
        assert_eq!(p_token("720"), None);
    }

    #[test]
    fn test_metadata_emptiness() {
        assert!(MediaMetadata::default().is_empty());
        let meta = MediaMetadata {
            source_id: Some("1234".to_string()),
            ..MediaMetadata::default()
        };
        assert!(!meta.is_empty());
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json, serde_json::json!({"sourceId": "1234"}));
    }

    #[test]
    fn test_serializes_camel_case_without_absent_fields() {
        let item = MediaItem::new(MediaKind::Audio, "https://cdn/a.mp3").with_bitrate(320);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["kind"], "audio");
        assert_eq!(json["bitrateKbps"], 320);
        assert!(json.get("resolution").is_none());
        assert!(json.get("sizeBytes").is_none());
    }
}
