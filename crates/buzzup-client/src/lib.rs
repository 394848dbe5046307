//! Upload client for the buzzup uploader.
//!
//! The orchestrator fans a batch of files out to transfer workers under a
//! bounded concurrency limit, publishes a typed event feed, and settles
//! every task into a terminal state even under partial failure or
//! cancellation. The transfer worker streams one file per request as
//! multipart form data.

pub mod orchestrator;
pub mod response;
pub mod transfer;

pub use orchestrator::UploadBatch;
pub use transfer::TransferClient;
