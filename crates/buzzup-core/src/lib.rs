//! Core library for the buzzup uploader.
//!
//! Domain models, the error taxonomy, configuration, the upload target
//! resolver, and the batch result aggregator shared by the transfer client
//! and the CLI.

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod report;
pub mod resolver;

pub use config::{ClientConfig, UploadConfig};
pub use error::UploadError;
pub use events::UploadEvent;
pub use models::{BatchResult, FileItem, TaskState, UploadTask};
pub use resolver::{resolve_target, RequestTarget, UploadRoute};
