//! Best-option selection over normalized media items.
//!
//! These rules behave the same whichever provider produced the candidates,
//! so callers never re-implement "best quality" per platform.
//!
//! # Selection Rules
//!
//! 1. Mixed candidate lists prefer video, then audio, then image
//! 2. Video: highest vertical resolution, then highest bitrate, then the provider's best flag
//! 3. Audio: highest bitrate, then the provider's best flag
//! 4. Image: largest pixel area, then the provider's best flag
//! 5. Remaining ties keep the earliest candidate
//!
//! # Example
//!
//! ```
//! use cognima_core::{MediaItem, MediaKind, select_best};
//!
//! let items = vec![
//!     MediaItem::new(MediaKind::Video, "a").with_quality("720p"),
//!     MediaItem::new(MediaKind::Video, "b").with_quality("1080p").with_best(true),
//! ];
//! assert_eq!(select_best(&items).and_then(|i| i.url.as_deref()), Some("b"));
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{RetrievalError, RetrievalResult};
use crate::media::{MediaItem, MediaKind};

/// Minimum-resolution thresholds understood by [`filter_by_minimum_resolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResolutionTier {
    P360,
    P480,
    P720,
    P1080,
}

impl ResolutionTier {
    /// All tiers, lowest first.
    pub const ALL: [Self; 4] = [Self::P360, Self::P480, Self::P720, Self::P1080];

    #[must_use]
    pub const fn height(self) -> u32 {
        match self {
            Self::P360 => 360,
            Self::P480 => 480,
            Self::P720 => 720,
            Self::P1080 => 1080,
        }
    }

    /// Tier for a labeled height.
    ///
    /// Heights between tiers round down; heights above 1080 count as 1080.
    /// Anything under 360 is unranked.
    #[must_use]
    pub fn for_height(height: u32) -> Option<Self> {
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|tier| height >= tier.height())
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.height())
    }
}

impl FromStr for ResolutionTier {
    type Err = RetrievalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "360p" => Ok(Self::P360),
            "480p" => Ok(Self::P480),
            "720p" => Ok(Self::P720),
            "1080p" => Ok(Self::P1080),
            other => Err(RetrievalError::configuration(
                "min_quality",
                format!("unsupported threshold '{other}', expected one of 360p, 480p, 720p, 1080p"),
            )),
        }
    }
}

/// Ranking key compared lexicographically. Higher is better.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Rank {
    kind: u8,
    primary: u64,
    secondary: u64,
    flagged: bool,
}

fn rank(item: &MediaItem) -> Rank {
    let bitrate = u64::from(item.bitrate_kbps.unwrap_or(0));
    let (primary, secondary) = match item.kind {
        MediaKind::Video => (u64::from(item.vertical_resolution().unwrap_or(0)), bitrate),
        MediaKind::Audio => (bitrate, 0),
        MediaKind::Image => (
            item.resolution
                .map_or(0, |r| u64::from(r.width) * u64::from(r.height)),
            0,
        ),
    };

    Rank {
        kind: item.kind.preference(),
        primary,
        secondary,
        flagged: item.is_best,
    }
}

fn best_ranked<'a>(items: impl Iterator<Item = &'a MediaItem>) -> Option<&'a MediaItem> {
    let mut best: Option<(&MediaItem, Rank)> = None;
    for item in items {
        let candidate = rank(item);
        // Strictly greater only, so ties keep the earliest item.
        if best.as_ref().is_none_or(|(_, current)| candidate > *current) {
            best = Some((item, candidate));
        }
    }
    best.map(|(item, _)| item)
}

/// Pick the single best candidate.
///
/// Returns `None` only when `items` is empty.
pub fn select_best(items: &[MediaItem]) -> Option<&MediaItem> {
    let item = best_ranked(items.iter())?;
    debug!(
        candidates = items.len(),
        kind = %item.kind,
        quality = item.quality.as_deref().unwrap_or("-"),
        "Selected best media item"
    );
    Some(item)
}

/// Pick the best candidate of one kind.
pub fn select_best_of_kind(items: &[MediaItem], kind: MediaKind) -> Option<&MediaItem> {
    best_ranked(items.iter().filter(|i| i.kind == kind))
}

/// Keep items whose quality label reaches at least `threshold`.
///
/// `threshold` must be one of `360p`, `480p`, `720p`, `1080p`; anything else
/// is a [`RetrievalError::Configuration`]. Heights come from a `<N>p` or
/// `WxH` label, else from the structured resolution; items with neither are
/// excluded. Relative order is preserved.
pub fn filter_by_minimum_resolution(
    items: Vec<MediaItem>,
    threshold: &str,
) -> RetrievalResult<Vec<MediaItem>> {
    let tier: ResolutionTier = threshold.parse()?;
    Ok(filter_by_tier(items, tier))
}

/// Typed form of [`filter_by_minimum_resolution`].
pub fn filter_by_tier(items: Vec<MediaItem>, tier: ResolutionTier) -> Vec<MediaItem> {
    let before = items.len();
    let kept: Vec<MediaItem> = items
        .into_iter()
        .filter(|item| {
            item.advertised_height()
                .and_then(ResolutionTier::for_height)
                .is_some_and(|t| t >= tier)
        })
        .collect();

    debug!(
        threshold = %tier,
        before,
        after = kept.len(),
        "Filtered media by minimum resolution"
    );
    kept
}

/// Keep items of the given kind, preserving order.
pub fn filter_by_kind(items: Vec<MediaItem>, kind: MediaKind) -> Vec<MediaItem> {
    items.into_iter().filter(|item| item.kind == kind).collect()
}

/// Find the item whose quality label matches `preferred` (case-insensitive).
///
/// Returns `None` rather than substituting a different quality.
pub fn find_quality<'a>(items: &'a [MediaItem], preferred: &str) -> Option<&'a MediaItem> {
    let preferred = preferred.trim();
    items.iter().find(|item| {
        item.quality
            .as_deref()
            .is_some_and(|q| q.trim().eq_ignore_ascii_case(preferred))
    })
}
