//! Error types for upload orchestration.

use thiserror::Error;

/// Failure modes of an upload batch or a single transfer.
///
/// Per-task failures (`Network`, `Rejected`, `MalformedResponse`,
/// `LocalFile`, `Cancelled`) settle one task as failed and leave the rest of
/// the batch running. `Configuration` and `AlreadyStarted` abort the whole
/// batch before any network activity.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Missing or invalid setup, detected before any request is sent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Connection, DNS, TLS or timeout failure before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("upload rejected: HTTP {status} {snippet}")]
    Rejected { status: u16, snippet: String },

    /// A success status whose body did not carry a file identifier.
    #[error("malformed response from service")]
    MalformedResponse,

    /// The file could not be opened or read on this machine.
    #[error("local file error: {0}")]
    LocalFile(String),

    /// The batch was cancelled before this transfer finished.
    #[error("upload cancelled")]
    Cancelled,

    /// An orchestrator instance processes exactly one batch.
    #[error("batch already started")]
    AlreadyStarted,
}

impl UploadError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, UploadError::Cancelled)
    }
}
