#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod batch;
pub mod credential;
pub mod download;
pub mod error;
pub mod link;
pub mod media;
pub mod query;
pub mod selection;

// Re-export commonly used types for convenience
pub use batch::{BatchOutcome, BatchReport, BatchSummary};
pub use credential::Credential;
pub use download::{CompletionStatus, DownloadResult};
pub use error::{RetrievalError, RetrievalResult};
pub use link::{DownloadLink, LinkSource};
pub use media::{MediaItem, MediaKind, MediaListing, MediaMetadata, Resolution};
pub use query::{
    AppListing, AppStore, CatalogueTitle, LookupRecord, QueryResult, ResultRecord, SearchHit,
    Track,
};
pub use selection::{
    ResolutionTier, filter_by_kind, filter_by_minimum_resolution, filter_by_tier, find_quality,
    select_best, select_best_of_kind,
};
