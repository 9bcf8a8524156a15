//! Retrieval client facade.
//!
//! [`RetrievalClient`] composes the registry, transport engine, normalizer,
//! selection, batch orchestrator and streaming downloader behind one typed
//! function per operation family.

use std::path::Path;
use std::sync::Arc;

use cognima_core::{
    BatchReport, Credential, DownloadLink, DownloadResult, MediaItem, MediaListing, QueryResult,
    RetrievalError, RetrievalResult, find_quality, select_best,
};
use serde_json::Value;
use tokio::io::AsyncWrite;

use crate::batch::{BatchOptions, run_batch};
use crate::config::ClientConfig;
use crate::download::{DownloadOptions, StreamingDownloader};
use crate::endpoint::{EndpointDescriptor, Profile};
use crate::http::{HttpBackend, ReqwestBackend};
use crate::normalize::{MediaOptions, Normalized, normalize};
use crate::params::Params;
use crate::registry;
use crate::transport::{CallOptions, TransportEngine};

// ============================================================================
// Type Aliases
// ============================================================================

/// Client backed by `reqwest`.
pub type DefaultRetrievalClient = RetrievalClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Entry point for every supported remote operation.
///
/// Operations are addressed by registry name (`"spotify.search"`,
/// `"facebook.download"`, ...). Credentials are passed per call and never
/// stored, so one client can serve many callers concurrently.
#[derive(Debug)]
pub struct RetrievalClient<B> {
    engine: TransportEngine<B>,
    downloader: StreamingDownloader<B>,
}

impl<B> Clone for RetrievalClient<B> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            downloader: self.downloader.clone(),
        }
    }
}

impl DefaultRetrievalClient {
    /// Create a client with the given configuration.
    pub fn new(config: ClientConfig) -> RetrievalResult<Self> {
        let backend = ReqwestBackend::new(&config)?;
        Self::with_backend(config, backend)
    }

    /// Create a client against the public hosts with default settings.
    pub fn default_client() -> RetrievalResult<Self> {
        Self::new(ClientConfig::default())
    }
}

impl<B: HttpBackend> RetrievalClient<B> {
    /// Create a client over a custom backend.
    pub fn with_backend(config: ClientConfig, backend: B) -> RetrievalResult<Self> {
        let engine = TransportEngine::new(Arc::new(backend), Arc::new(config))?;
        Ok(Self {
            downloader: StreamingDownloader::new(engine.clone()),
            engine,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        self.engine.config()
    }

    #[must_use]
    pub const fn engine(&self) -> &TransportEngine<B> {
        &self.engine
    }

    #[must_use]
    pub const fn downloader(&self) -> &StreamingDownloader<B> {
        &self.downloader
    }

    /// Batch options using the configured default throttle.
    #[must_use]
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions::with_throttle(self.config().batch_throttle())
    }

    // ------------------------------------------------------------------------
    // Generic calls
    // ------------------------------------------------------------------------

    /// Run `operation` and normalize the payload through its profile.
    pub async fn call(
        &self,
        operation: &str,
        params: &Params,
        credential: Option<&Credential>,
    ) -> RetrievalResult<Normalized> {
        let descriptor = registry::lookup(operation)?;
        self.run(descriptor, params, credential, CallOptions::default(), &MediaOptions::all())
            .await
    }

    /// [`call`](Self::call) with an overall deadline and media narrowing.
    pub async fn call_with(
        &self,
        operation: &str,
        params: &Params,
        credential: Option<&Credential>,
        call: CallOptions,
        media: &MediaOptions,
    ) -> RetrievalResult<Normalized> {
        let descriptor = registry::lookup(operation)?;
        self.run(descriptor, params, credential, call, media).await
    }

    /// Raw payload of `operation`, bypassing normalization.
    pub async fn passthrough(
        &self,
        operation: &str,
        params: &Params,
        credential: Option<&Credential>,
    ) -> RetrievalResult<Value> {
        let descriptor = registry::lookup(operation)?;
        let raw = self
            .engine
            .execute(descriptor, params, credential, CallOptions::default())
            .await?;
        Ok(raw.body)
    }

    // ------------------------------------------------------------------------
    // Typed families
    // ------------------------------------------------------------------------

    /// Media renditions of a post or video, narrowed by `options`.
    pub async fn media(
        &self,
        operation: &str,
        params: &Params,
        credential: Option<&Credential>,
        options: &MediaOptions,
    ) -> RetrievalResult<Vec<MediaItem>> {
        self.media_listing(operation, params, credential, options)
            .await
            .map(|listing| listing.items)
    }

    /// Like [`media`](Self::media), keeping the title, author and totals the
    /// provider reported about the source.
    pub async fn media_listing(
        &self,
        operation: &str,
        params: &Params,
        credential: Option<&Credential>,
        options: &MediaOptions,
    ) -> RetrievalResult<MediaListing> {
        let descriptor = resolve(operation, Family::Media)?;
        self.run(descriptor, params, credential, CallOptions::default(), options)
            .await?
            .into_media_listing()
    }

    /// The single best rendition, or `None` when the provider returned none.
    pub async fn best_media(
        &self,
        operation: &str,
        params: &Params,
        credential: Option<&Credential>,
    ) -> RetrievalResult<Option<MediaItem>> {
        let items = self
            .media(operation, params, credential, &MediaOptions::all())
            .await?;
        Ok(select_best(&items).cloned())
    }

    /// The rendition labeled `preferred` (e.g. `"720p"`), if offered.
    pub async fn media_in_quality(
        &self,
        operation: &str,
        params: &Params,
        credential: Option<&Credential>,
        preferred: &str,
    ) -> RetrievalResult<Option<MediaItem>> {
        let items = self
            .media(operation, params, credential, &MediaOptions::all())
            .await?;
        Ok(find_quality(&items, preferred).cloned())
    }

    /// Search or lookup results.
    pub async fn query(
        &self,
        operation: &str,
        params: &Params,
        credential: Option<&Credential>,
    ) -> RetrievalResult<QueryResult> {
        let descriptor = resolve(operation, Family::Query)?;
        self.run(descriptor, params, credential, CallOptions::default(), &MediaOptions::all())
            .await?
            .into_query()
    }

    /// A single direct file link.
    pub async fn link(
        &self,
        operation: &str,
        params: &Params,
        credential: Option<&Credential>,
    ) -> RetrievalResult<DownloadLink> {
        let descriptor = resolve(operation, Family::Link)?;
        self.run(descriptor, params, credential, CallOptions::default(), &MediaOptions::all())
            .await?
            .into_link()
    }

    /// Metadata documents, details and completions, unwrapped from the envelope.
    pub async fn document(
        &self,
        operation: &str,
        params: &Params,
        credential: Option<&Credential>,
    ) -> RetrievalResult<Value> {
        let descriptor = resolve(operation, Family::Document)?;
        self.run(descriptor, params, credential, CallOptions::default(), &MediaOptions::all())
            .await?
            .into_document()
    }

    // ------------------------------------------------------------------------
    // Batches
    // ------------------------------------------------------------------------

    /// Run `operation` once per parameter set, sequentially.
    ///
    /// An unknown operation fails the whole call; every other failure is
    /// reported per input.
    pub async fn batch(
        &self,
        operation: &str,
        inputs: Vec<Params>,
        credential: Option<&Credential>,
        options: &BatchOptions,
    ) -> RetrievalResult<BatchReport<Params, Normalized>> {
        let descriptor = registry::lookup(operation)?;
        tracing::debug!(operation = descriptor.name, inputs = inputs.len(), "Starting batch");
        let report = run_batch(
            inputs,
            |params| {
                let params = params.clone();
                async move {
                    let call = CallOptions::default();
                    self.run(descriptor, &params, credential, call, &MediaOptions::all())
                        .await
                }
            },
            options,
        )
        .await;
        Ok(report)
    }

    /// Fetch media for each URL, sequentially, narrowing each result by `media`.
    pub async fn batch_media(
        &self,
        operation: &str,
        urls: Vec<String>,
        credential: Option<&Credential>,
        media: &MediaOptions,
        options: &BatchOptions,
    ) -> RetrievalResult<BatchReport<String, Vec<MediaItem>>> {
        let descriptor = resolve(operation, Family::Media)?;
        let media = *media;
        tracing::debug!(operation = descriptor.name, inputs = urls.len(), "Starting media batch");
        let report = run_batch(
            urls,
            |url| {
                let params = Params::new().with("url", url.as_str());
                async move {
                    self.run(descriptor, &params, credential, CallOptions::default(), &media)
                        .await?
                        .into_media()
                }
            },
            options,
        )
        .await;
        Ok(report)
    }

    // ------------------------------------------------------------------------
    // Downloads
    // ------------------------------------------------------------------------

    /// Stream `url` into `sink`.
    pub async fn download<W>(
        &self,
        url: &str,
        sink: W,
        options: &DownloadOptions,
    ) -> RetrievalResult<DownloadResult>
    where
        W: AsyncWrite + Unpin + Send,
    {
        self.downloader.download(url, sink, options).await
    }

    /// Stream `url` into a new file at `path`.
    pub async fn download_to_path(
        &self,
        url: &str,
        path: &Path,
        options: &DownloadOptions,
    ) -> RetrievalResult<DownloadResult> {
        self.downloader.download_to_path(url, path, options).await
    }

    /// Write the file behind an already resolved link into `sink`.
    pub async fn deliver<W>(
        &self,
        link: &DownloadLink,
        sink: W,
        options: &DownloadOptions,
    ) -> RetrievalResult<DownloadResult>
    where
        W: AsyncWrite + Unpin + Send,
    {
        self.downloader.deliver(link, sink, options).await
    }

    /// Resolve a link operation, then write its file into `sink`.
    ///
    /// `sink` is shut down whether or not the link resolves.
    pub async fn fetch<W>(
        &self,
        operation: &str,
        params: &Params,
        credential: Option<&Credential>,
        sink: W,
        options: &DownloadOptions,
    ) -> RetrievalResult<(DownloadLink, DownloadResult)>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let link = match self.link(operation, params, credential).await {
            Ok(link) => link,
            Err(e) => return Err(self.downloader.abandon(e, sink, operation, options).await),
        };
        let result = self.downloader.deliver(&link, sink, options).await?;
        Ok((link, result))
    }

    /// Stream a binary operation such as `filmes.watch` into `sink`.
    pub async fn watch<W>(
        &self,
        operation: &str,
        params: &Params,
        credential: Option<&Credential>,
        sink: W,
        options: &DownloadOptions,
    ) -> RetrievalResult<DownloadResult>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let descriptor = resolve(operation, Family::Stream)?;
        self.downloader
            .download_endpoint(descriptor, params, credential, sink, options)
            .await
    }

    async fn run(
        &self,
        descriptor: &'static EndpointDescriptor,
        params: &Params,
        credential: Option<&Credential>,
        call: CallOptions,
        media: &MediaOptions,
    ) -> RetrievalResult<Normalized> {
        let raw = self.engine.execute(descriptor, params, credential, call).await?;
        let normalized = normalize(descriptor, &raw.body, media)?;
        tracing::debug!(
            operation = descriptor.name,
            attempts = raw.attempts,
            entity = normalized.label(),
            "Normalized response"
        );
        Ok(normalized)
    }
}

/// Entity family a typed function expects from its operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Media,
    Query,
    Link,
    Document,
    Stream,
}

impl Family {
    const fn of(profile: Profile) -> Self {
        match profile {
            Profile::Media(_) => Self::Media,
            Profile::Query(_) => Self::Query,
            Profile::Link(_) => Self::Link,
            Profile::Document(_) => Self::Document,
            Profile::Stream => Self::Stream,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Media => "media",
            Self::Query => "query",
            Self::Link => "link",
            Self::Document => "document",
            Self::Stream => "stream",
        }
    }
}

/// Resolve `operation` and check it yields `family` before any request is sent.
fn resolve(operation: &str, family: Family) -> RetrievalResult<&'static EndpointDescriptor> {
    let descriptor = registry::lookup(operation)?;
    let actual = Family::of(descriptor.profile);
    if actual == family {
        Ok(descriptor)
    } else {
        Err(RetrievalError::configuration(
            descriptor.name,
            format!("operation returns {}, not {}", actual.label(), family.label()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::testing::RecordingSink;
    use crate::http::testing::{FakeBackend, Scripted};
    use crate::retry::RetryPolicy;
    use cognima_core::{CompletionStatus, LinkSource, MediaKind, ResultRecord};
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    fn client(backend: &FakeBackend) -> RetrievalClient<FakeBackend> {
        let config = ClientConfig::new()
            .with_single_host("https://api.test/api/v1")
            .with_retry(RetryPolicy::none());
        RetrievalClient::with_backend(config, backend.clone()).unwrap()
    }

    fn url(value: &str) -> Params {
        Params::new().with("url", value)
    }

    fn two_videos() -> Value {
        json!({
            "success": true,
            "videos": [
                {"url": "a", "resolution": "480p"},
                {"url": "b", "resolution": "1080p"}
            ]
        })
    }

    #[tokio::test]
    async fn test_video_download_picks_highest_resolution() {
        let backend = FakeBackend::new().then(Scripted::json(200, &two_videos()));
        let client = client(&backend);
        let key = Credential::new("secret-key");

        let best = client
            .best_media("video.download", &url("https://fb.watch/x"), Some(&key))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(best.url.as_deref(), Some("b"));
        assert_eq!(best.kind, MediaKind::Video);
        let requests = backend.requests();
        assert_eq!(requests[0].header("apikey"), Some("secret-key"));
        assert!(requests[0].url.path().ends_with("/facebook/download"));
    }

    #[tokio::test]
    async fn test_media_in_quality() {
        let backend = FakeBackend::new().then(Scripted::json(200, &two_videos()));
        let client = client(&backend);
        let key = Credential::new("k");

        let item = client
            .media_in_quality("facebook.download", &url("https://fb.watch/x"), Some(&key), "480p")
            .await
            .unwrap();
        assert_eq!(item.and_then(|i| i.url).as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_missing_credential_sends_nothing() {
        let backend = FakeBackend::new();
        let client = client(&backend);

        let err = client
            .media("facebook.download", &url("https://fb.watch/x"), None, &MediaOptions::all())
            .await
            .unwrap_err();

        assert!(matches!(err, RetrievalError::Validation { .. }));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_family_mismatch_is_rejected_before_sending() {
        let backend = FakeBackend::new();
        let client = client(&backend);

        let err = client
            .query("reddit.download", &url("https://reddit.com/r/x"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, RetrievalError::Configuration { .. }));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_operation() {
        let client = client(&FakeBackend::new());
        let err = client.call("myspace.download", &Params::new(), None).await.unwrap_err();
        assert!(err.is_caller_error());
    }

    #[tokio::test]
    async fn test_query_returns_tracks() {
        let backend = FakeBackend::new().then(Scripted::json(
            200,
            &json!({
                "success": true,
                "query": "daft punk",
                "results": [
                    {"title": "One More Time", "artists": "Daft Punk",
                     "link": "https://open.spotify.com/track/1"},
                    {"title": "Aerodynamic", "artists": ["Daft Punk"]}
                ]
            }),
        ));
        let client = client(&backend);

        let result = client
            .query("spotify.search", &Params::new().with("q", "daft punk"), None)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.query.as_deref(), Some("daft punk"));
        let ResultRecord::Track(first) = &result.records[0] else {
            panic!("expected a track");
        };
        assert_eq!(first.title, "One More Time");
    }

    #[tokio::test]
    async fn test_envelope_failure_surfaces_provider_message() {
        let backend = FakeBackend::new().then(Scripted::json(
            200,
            &json!({"success": false, "message": "video is private"}),
        ));
        let client = client(&backend);

        let err = client
            .link("reddit.download", &url("https://reddit.com/r/x"), None)
            .await
            .unwrap_err();
        assert_eq!(err, RetrievalError::provider("video is private"));
    }

    #[tokio::test]
    async fn test_fetch_resolves_link_then_streams() {
        let backend = FakeBackend::new()
            .then(Scripted::json(
                200,
                &json!({"success": true, "data": {
                    "downloadUrl": "https://cdn.test/v.mp4",
                    "title": "clip"
                }}),
            ))
            .then(Scripted::stream(Some(6), &[b"abc", b"def"]));
        let client = client(&backend);
        let mut sink: Vec<u8> = Vec::new();

        let (link, result) = client
            .fetch(
                "reddit.download",
                &url("https://reddit.com/r/x"),
                None,
                &mut sink,
                &DownloadOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(
            link.source,
            LinkSource::Remote {
                url: "https://cdn.test/v.mp4".to_string()
            }
        );
        assert_eq!(sink, b"abcdef");
        assert_eq!(result.bytes_written, 6);
        assert_eq!(result.status, CompletionStatus::Verified);
        assert_eq!(backend.requests()[1].url.as_str(), "https://cdn.test/v.mp4");
    }

    #[tokio::test]
    async fn test_fetch_closes_sink_when_link_fails() {
        let backend = FakeBackend::new().then(Scripted::json(
            200,
            &json!({"success": false, "message": "post removed"}),
        ));
        let client = client(&backend);
        let sink = RecordingSink::default();

        let err = client
            .fetch(
                "reddit.download",
                &url("https://reddit.com/r/x"),
                None,
                sink.clone(),
                &DownloadOptions::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err, RetrievalError::provider("post removed"));
        assert!(sink.is_closed());
        assert!(sink.data().is_empty());
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test]
    async fn test_media_listing_keeps_source_metadata() {
        let payload = json!({
            "success": true,
            "data": {
                "metadata": {"title": "Clip", "platform": "youtube", "duration": 61},
                "totalItems": 2,
                "videoCount": 1,
                "audioCount": 1,
                "imageCount": 0,
                "media": [
                    {"type": "video", "url": "v", "quality": "720p"},
                    {"type": "audio", "url": "a", "abr": 129.478}
                ]
            }
        });
        let backend = FakeBackend::new().then(Scripted::json(200, &payload));
        let client = client(&backend);

        let listing = client
            .media_listing(
                "alldl",
                &url("https://youtu.be/x"),
                None,
                &MediaOptions::of_kind(MediaKind::Audio),
            )
            .await
            .unwrap();

        assert_eq!(listing.items.len(), 1);
        assert_eq!(listing.items[0].bitrate_kbps, Some(129));
        let meta = listing.metadata.unwrap();
        assert_eq!(meta.title.as_deref(), Some("Clip"));
        assert_eq!(meta.duration_secs, Some(61.0));
        assert_eq!(meta.total_items, Some(2));
        assert_eq!(meta.image_count, Some(0));
    }

    /// Log output shared between a test subscriber and the assertions.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_credentials_never_reach_logs() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer({
                let logs = logs.clone();
                move || logs.clone()
            })
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let backend = FakeBackend::new()
            .then(Scripted::json(503, &json!({"message": "busy"})))
            .then(Scripted::json(200, &two_videos()))
            .then(Scripted::json(429, &json!({"message": "slow down"})));
        let config = ClientConfig::new()
            .with_single_host("https://api.test/api/v1")
            .with_retry(
                RetryPolicy::default()
                    .with_base_delay(Duration::from_millis(10))
                    .with_jitter_percent(0),
            );
        let client = RetrievalClient::with_backend(config, backend.clone()).unwrap();
        let key = Credential::new("ck_live_7f3a9c");

        let best = client
            .best_media("facebook.download", &url("https://fb.watch/x"), Some(&key))
            .await
            .unwrap();
        assert!(best.is_some());
        let err = client
            .media(
                "facebook.download",
                &url("https://fb.watch/y"),
                Some(&key),
                &MediaOptions::all(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::RateLimit { .. }));
        assert_eq!(backend.request_count(), 3);
        assert_eq!(backend.requests()[0].header("apikey"), Some("ck_live_7f3a9c"));

        let text = logs.text();
        assert!(text.contains("Transient failure; retrying"));
        assert!(text.contains("Rate limited"));
        assert!(!text.contains("ck_live_7f3a9c"));
    }

    #[tokio::test]
    async fn test_watch_requires_binary_operation() {
        let client = client(&FakeBackend::new());
        let err = client
            .watch(
                "filmes.details",
                &Params::new().with("id", "42"),
                None,
                Vec::<u8>::new(),
                &DownloadOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::Configuration { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_media_reports_partial_failure() {
        let backend = FakeBackend::new()
            .then(Scripted::json(200, &two_videos()))
            .then(Scripted::json(400, &json!({"message": "unsupported url"})))
            .then(Scripted::json(200, &two_videos()));
        let client = client(&backend);
        let key = Credential::new("k");

        let report = client
            .batch_media(
                "facebook.download",
                vec![
                    "https://fb/1".to_string(),
                    "https://fb/2".to_string(),
                    "https://fb/3".to_string(),
                ],
                Some(&key),
                &MediaOptions::best(),
                &BatchOptions::with_throttle(Duration::from_secs(2)),
            )
            .await
            .unwrap();

        let summary = report.summary();
        assert_eq!((summary.succeeded, summary.failed, summary.skipped), (2, 1, 0));
        assert_eq!(
            report.outcomes[1].result,
            Err(RetrievalError::invalid_request("unsupported url"))
        );
        let first = report.outcomes[0].result.as_ref().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].url.as_deref(), Some("b"));
        assert_eq!(report.outcomes[2].input, "https://fb/3");
        assert!(report.elapsed >= Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_batch_unknown_operation_fails_up_front() {
        let backend = FakeBackend::new();
        let client = client(&backend);
        let result = client
            .batch("nope", vec![Params::new()], None, &client.batch_options())
            .await;
        assert!(result.is_err());
        assert_eq!(backend.request_count(), 0);
    }
}
