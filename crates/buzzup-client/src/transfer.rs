//! Transfer worker: one streaming multipart upload per file.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::multipart;
use tokio::fs::File;
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;

use buzzup_core::{ClientConfig, RequestTarget, UploadError};

use crate::response::{body_snippet, parse_file_id};

/// Chunk size for streaming file reads.
const READ_CHUNK_BYTES: usize = 64 * 1024;

/// HTTP client for the upload service. Cheap to clone; the connection pool
/// is shared between clones.
#[derive(Clone)]
pub struct TransferClient {
    client: reqwest::Client,
    share_url: String,
}

impl TransferClient {
    pub fn new(config: &ClientConfig) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.transfer_timeout)
            .build()
            .map_err(|e| UploadError::Network(e.to_string()))?;
        Ok(Self {
            client,
            share_url: config.share_url.trim_end_matches('/').to_string(),
        })
    }

    /// Upload one file and return its shareable URL.
    ///
    /// The file is streamed in chunks; each chunk handed to the transport
    /// reports fractional progress on `progress`. Cancellation is honored
    /// between chunks and around the request itself, so a hung connection
    /// does not delay it.
    pub async fn upload(
        &self,
        target: &RequestTarget,
        cancel: &CancellationToken,
        progress: mpsc::Sender<f64>,
    ) -> Result<String, UploadError> {
        let file = File::open(&target.file.path)
            .await
            .map_err(|e| UploadError::LocalFile(e.to_string()))?;
        let size = target.file.size;

        let stream = ProgressStream::new(file, size, progress, cancel.clone());
        let part = multipart::Part::stream_with_length(reqwest::Body::wrap_stream(stream), size)
            .file_name(target.file.name.clone());
        let mut form = multipart::Form::new().part("file", part);
        if let Some(notes) = &target.notes {
            form = form.text("notes", notes.clone());
        }

        let mut request = self
            .client
            .post(&target.url)
            .header("Authorization", target.authorization_header());
        if !target.query.is_empty() {
            request = request.query(&target.query);
        }
        let request = request.multipart(form);

        tracing::debug!(url = %target.url, file = %target.file.name, "Sending upload request");

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(UploadError::Cancelled),
            result = request.send() => result.map_err(|e| classify_error(e, cancel))?,
        };

        let status = response.status().as_u16();
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(UploadError::Cancelled),
            result = read_body(response) => result.map_err(|e| classify_error(e, cancel))?,
        };

        if status != 200 && status != 201 {
            return Err(UploadError::Rejected {
                status,
                snippet: body_snippet(&body),
            });
        }

        match parse_file_id(&body) {
            Some(id) => Ok(format!("{}/{}", self.share_url, id)),
            None => Err(UploadError::MalformedResponse),
        }
    }
}

/// Upper bound on how much of a response body is read. Success bodies are a
/// short JSON object and error bodies only contribute a snippet, so a
/// misbehaving service cannot make a worker buffer an arbitrary payload.
const MAX_BODY_BYTES: usize = 64 * 1024;

async fn read_body(response: reqwest::Response) -> Result<String, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut buf = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let remaining = MAX_BODY_BYTES - buf.len();
        buf.extend_from_slice(&chunk[..chunk.len().min(remaining)]);
        if buf.len() >= MAX_BODY_BYTES {
            break;
        }
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Map a transport failure onto the error taxonomy. Body errors carry the
/// underlying `io::Error` from the file stream, so those become local file
/// failures; everything else is a network failure.
fn classify_error(err: reqwest::Error, cancel: &CancellationToken) -> UploadError {
    if cancel.is_cancelled() {
        return UploadError::Cancelled;
    }
    if err.is_body() {
        let mut source = std::error::Error::source(&err);
        while let Some(inner) = source {
            if let Some(io_err) = inner.downcast_ref::<io::Error>() {
                if io_err.kind() == io::ErrorKind::Interrupted {
                    return UploadError::Cancelled;
                }
                return UploadError::LocalFile(io_err.to_string());
            }
            source = inner.source();
        }
    }
    UploadError::Network(err.to_string())
}

/// Wraps the chunked file reader to count transmitted bytes and surface
/// cancellation between chunks.
struct ProgressStream {
    inner: ReaderStream<File>,
    sent: u64,
    total: u64,
    progress: mpsc::Sender<f64>,
    cancel: CancellationToken,
}

impl ProgressStream {
    fn new(
        file: File,
        total: u64,
        progress: mpsc::Sender<f64>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            inner: ReaderStream::with_capacity(file, READ_CHUNK_BYTES),
            sent: 0,
            total,
            progress,
            cancel,
        }
    }
}

impl Stream for ProgressStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.cancel.is_cancelled() {
            return Poll::Ready(Some(Err(io::Error::new(
                io::ErrorKind::Interrupted,
                "upload cancelled",
            ))));
        }
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.sent += chunk.len() as u64;
                if this.total > 0 {
                    let fraction = (this.sent as f64 / this.total as f64).min(1.0);
                    // Progress is advisory; drop updates the receiver cannot
                    // keep up with rather than stalling the transfer.
                    let _ = this.progress.try_send(fraction);
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            other => other,
        }
    }
}
