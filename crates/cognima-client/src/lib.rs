#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod batch;
pub mod client;
pub mod config;
pub mod download;
pub mod endpoint;
pub mod http;
pub mod normalize;
pub mod params;
pub mod registry;
pub mod retry;
pub mod transport;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::{DefaultRetrievalClient, RetrievalClient};

// Configuration
pub use config::{ApiHost, ClientConfig};
pub use retry::RetryPolicy;

// Operations
pub use batch::{BatchOptions, run_batch};
pub use download::{DownloadOptions, StreamingDownloader};
pub use endpoint::{AuthStyle, EndpointDescriptor, HttpMethod, ParamKind, ParamLocation, ParamSpec};
pub use http::{HttpBackend, ReqwestBackend};
pub use normalize::{MediaOptions, Normalized};
pub use params::{ParamValue, Params};
pub use transport::{CallOptions, RawResponse, TransportEngine};

// Domain types
pub use cognima_core::{
    BatchOutcome, BatchReport, BatchSummary, CompletionStatus, Credential, DownloadLink,
    DownloadResult, LinkSource, MediaItem, MediaKind, MediaListing, MediaMetadata, QueryResult,
    Resolution, ResolutionTier, ResultRecord, RetrievalError, RetrievalResult,
};

// Silence unused dev-dependency warnings
#[cfg(test)]
use wiremock as _;
