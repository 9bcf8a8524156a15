//! Streaming downloader.
//!
//! Bytes flow from the network to a caller-supplied [`AsyncWrite`] sink in
//! chunks no larger than the configured `chunk_size`, so memory use is
//! bounded regardless of file size. The sink is always shut down before a
//! call returns, on success and on every failure path.

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use cognima_core::{
    CompletionStatus, Credential, DownloadLink, DownloadResult, LinkSource, RetrievalError,
    RetrievalResult,
};
use futures_util::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

use crate::endpoint::{EndpointDescriptor, ResponseShape};
use crate::http::{ByteStream, HttpBackend, HttpRequest, classify_status};
use crate::params::Params;
use crate::transport::{Deadline, TransportEngine};

/// Bytes of an error body kept for the error message.
const ERROR_BODY_LIMIT: usize = 4 * 1024;

/// Per-download options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Overall budget, from request to the last byte written.
    pub deadline: Option<Duration>,
    /// Name reported as the result's destination. Defaults to the source URL.
    pub label: Option<String>,
}

impl DownloadOptions {
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// What a finished transfer looked like before the sink was closed.
struct Transfer {
    bytes_written: u64,
    content_type: Option<String>,
    declared_length: Option<u64>,
}

/// Streams remote files into sinks.
#[derive(Debug)]
pub struct StreamingDownloader<B> {
    engine: TransportEngine<B>,
}

impl<B> Clone for StreamingDownloader<B> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

impl<B: HttpBackend> StreamingDownloader<B> {
    /// Share the engine's backend, configuration and credential handling.
    #[must_use]
    pub const fn new(engine: TransportEngine<B>) -> Self {
        Self { engine }
    }

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
        let mut sink = sink;
        let request = match parse_source(url) {
            Ok(parsed) => HttpRequest::get(parsed),
            Err(e) => return finish(Err(e), &mut sink, url, options).await,
        };
        self.stream_request(request, sink, options, url).await
    }

    /// Stream a binary-shaped endpoint (such as a catalogue `watch` stream) into `sink`.
    pub async fn download_endpoint<W>(
        &self,
        descriptor: &EndpointDescriptor,
        params: &Params,
        credential: Option<&Credential>,
        sink: W,
        options: &DownloadOptions,
    ) -> RetrievalResult<DownloadResult>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut sink = sink;
        let request = if descriptor.shape == ResponseShape::Binary {
            self.engine.prepare(descriptor, params, credential)
        } else {
            Err(RetrievalError::configuration(
                descriptor.name,
                "endpoint does not return a binary stream",
            ))
        };
        match request {
            Ok(request) => {
                let source = request.url.to_string();
                self.stream_request(request, sink, options, &source).await
            }
            Err(e) => finish(Err(e), &mut sink, descriptor.name, options).await,
        }
    }

    /// Write the file behind `link` into `sink`, fetching remote links and
    /// decoding inline payloads.
    pub async fn deliver<W>(
        &self,
        link: &DownloadLink,
        sink: W,
        options: &DownloadOptions,
    ) -> RetrievalResult<DownloadResult>
    where
        W: AsyncWrite + Unpin + Send,
    {
        match &link.source {
            LinkSource::Remote { url } => self.download(url, sink, options).await,
            LinkSource::Inline { base64 } => {
                let mut sink = sink;
                let label = link.file_name.as_deref().unwrap_or(&link.provider);
                let outcome = bounded(options.deadline, async {
                    let bytes = decode_inline(base64)?;
                    write_chunked(&mut sink, &bytes, self.chunk_size()).await?;
                    Ok(Transfer {
                        bytes_written: bytes.len() as u64,
                        content_type: link.mime_type.clone(),
                        declared_length: Some(bytes.len() as u64),
                    })
                })
                .await;
                finish(outcome, &mut sink, label, options).await
            }
        }
    }

    /// Stream `url` into a new file at `path`.
    ///
    /// A failed transfer removes the partial file.
    pub async fn download_to_path(
        &self,
        url: &str,
        path: &Path,
        options: &DownloadOptions,
    ) -> RetrievalResult<DownloadResult> {
        let file = tokio::fs::File::create(path)
            .await
            .map_err(|e| RetrievalError::from_io_error(&e))?;
        let options = DownloadOptions {
            label: Some(path.display().to_string()),
            ..options.clone()
        };

        let result = self.download(url, file, &options).await;
        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(path).await {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to remove partial download"
                );
            }
        }
        result
    }

    /// Close `sink` for a download that failed before any transfer began.
    pub(crate) async fn abandon<W>(
        &self,
        error: RetrievalError,
        mut sink: W,
        source: &str,
        options: &DownloadOptions,
    ) -> RetrievalError
    where
        W: AsyncWrite + Unpin + Send,
    {
        fail(error, &mut sink, source, options).await
    }

    fn chunk_size(&self) -> usize {
        self.engine.config().chunk_size()
    }

    async fn stream_request<W>(
        &self,
        request: HttpRequest,
        mut sink: W,
        options: &DownloadOptions,
        source: &str,
    ) -> RetrievalResult<DownloadResult>
    where
        W: AsyncWrite + Unpin + Send,
    {
        tracing::debug!(url = %request.url, "Starting download");
        let outcome = bounded(options.deadline, self.transfer(request, &mut sink)).await;
        finish(outcome, &mut sink, source, options).await
    }

    async fn transfer<W>(&self, request: HttpRequest, sink: &mut W) -> RetrievalResult<Transfer>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let response = self.engine.backend().open_stream(request).await?;
        if !(200..300).contains(&response.status) {
            let body = read_error_body(response.body).await;
            return Err(classify_status(response.status, &body));
        }

        let declared_length = response.content_length;
        let chunk_size = self.chunk_size();
        let mut body = response.body;
        let mut written: u64 = 0;

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    return Err(declared_length.map_or(e, |expected| {
                        RetrievalError::incomplete_transfer(expected, written)
                    }));
                }
            };
            write_chunked(sink, &chunk, chunk_size).await?;
            written += chunk.len() as u64;
        }

        if let Some(expected) = declared_length {
            if expected != written {
                return Err(RetrievalError::incomplete_transfer(expected, written));
            }
        }
        Ok(Transfer {
            bytes_written: written,
            content_type: response.content_type,
            declared_length,
        })
    }
}

/// Run `transfer` within `deadline`. Dropping the future on expiry drops the connection.
async fn bounded<F>(deadline: Option<Duration>, transfer: F) -> RetrievalResult<Transfer>
where
    F: Future<Output = RetrievalResult<Transfer>>,
{
    let deadline = Deadline::start(deadline);
    match deadline.remaining() {
        Err(e) => Err(e),
        Ok(None) => transfer.await,
        Ok(Some(left)) => tokio::time::timeout(left, transfer)
            .await
            .unwrap_or_else(|_| Err(deadline.error())),
    }
}

/// Shut the sink down and build the result. An earlier error wins over a shutdown error.
async fn finish<W>(
    outcome: RetrievalResult<Transfer>,
    sink: &mut W,
    source: &str,
    options: &DownloadOptions,
) -> RetrievalResult<DownloadResult>
where
    W: AsyncWrite + Unpin + Send,
{
    let transfer = match outcome {
        Ok(transfer) => transfer,
        Err(e) => return Err(fail(e, sink, source, options).await),
    };
    sink.shutdown()
        .await
        .map_err(|e| RetrievalError::from_io_error(&e))?;
    let destination = options.label.clone().unwrap_or_else(|| source.to_string());

    let status = match transfer.declared_length {
        Some(_) => CompletionStatus::Verified,
        None => CompletionStatus::Unverified,
    };
    tracing::info!(
        destination = %destination,
        bytes = transfer.bytes_written,
        verified = matches!(status, CompletionStatus::Verified),
        "Download completed"
    );
    Ok(DownloadResult {
        destination,
        bytes_written: transfer.bytes_written,
        content_type: transfer.content_type,
        declared_length: transfer.declared_length,
        status,
    })
}

/// Shut the sink down after a failure and hand the failure back.
async fn fail<W>(
    error: RetrievalError,
    sink: &mut W,
    source: &str,
    options: &DownloadOptions,
) -> RetrievalError
where
    W: AsyncWrite + Unpin + Send,
{
    if let Err(e) = sink.shutdown().await {
        tracing::debug!(error = %e, "Sink shutdown failed after download error");
    }
    let destination = options.label.as_deref().unwrap_or(source);
    tracing::warn!(destination = %destination, error = %error, "Download failed");
    error
}

async fn write_chunked<W>(sink: &mut W, bytes: &[u8], chunk_size: usize) -> RetrievalResult<()>
where
    W: AsyncWrite + Unpin + Send,
{
    for piece in bytes.chunks(chunk_size.max(1)) {
        sink.write_all(piece)
            .await
            .map_err(|e| RetrievalError::from_io_error(&e))?;
    }
    Ok(())
}

async fn read_error_body(mut body: ByteStream) -> Vec<u8> {
    let mut collected = Vec::new();
    while collected.len() < ERROR_BODY_LIMIT {
        match body.next().await {
            Some(Ok(chunk)) => collected.extend_from_slice(&chunk),
            _ => break,
        }
    }
    collected.truncate(ERROR_BODY_LIMIT);
    collected
}

fn parse_source(url: &str) -> RetrievalResult<Url> {
    match Url::parse(url.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(parsed),
        Ok(parsed) => Err(RetrievalError::validation(
            "url",
            format!("unsupported URL scheme '{}'", parsed.scheme()),
        )),
        Err(e) => Err(RetrievalError::validation("url", e.to_string())),
    }
}

/// Decode a base64 payload, tolerating a `data:<mime>;base64,` prefix.
fn decode_inline(payload: &str) -> RetrievalResult<Vec<u8>> {
    let encoded = payload
        .split_once(";base64,")
        .map_or(payload, |(_, data)| data)
        .trim();
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| RetrievalError::provider(format!("inline payload is not valid base64 ({e})")))
}
