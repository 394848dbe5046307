//! Upload target resolver.
//!
//! Pure translation of an [`UploadConfig`] plus one file into the concrete
//! request shape the transfer worker executes. No I/O happens here; the only
//! failure is a missing credential, which aborts the batch before any
//! network call.

use crate::config::UploadConfig;
use crate::error::UploadError;
use crate::models::FileItem;

/// Which routing hints a batch carries. Every combination is explicit so
/// the wire shape of each is enumerable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRoute {
    /// No hints; the service picks the account root.
    Default,
    /// Upload into a specific directory.
    ParentDirectory(String),
    /// Pin the stored file to a storage location.
    Location(String),
    /// Both hints set; both are passed through and the service decides
    /// precedence.
    ParentAndLocation {
        parent_directory_id: String,
        location_id: String,
    },
}

impl UploadRoute {
    pub fn from_config(config: &UploadConfig) -> Self {
        match (&config.parent_directory_id, &config.location_id) {
            (Some(parent), Some(location)) => UploadRoute::ParentAndLocation {
                parent_directory_id: parent.clone(),
                location_id: location.clone(),
            },
            (Some(parent), None) => UploadRoute::ParentDirectory(parent.clone()),
            (None, Some(location)) => UploadRoute::Location(location.clone()),
            (None, None) => UploadRoute::Default,
        }
    }

    pub fn parent_directory_id(&self) -> Option<&str> {
        match self {
            UploadRoute::ParentDirectory(parent) => Some(parent),
            UploadRoute::ParentAndLocation {
                parent_directory_id,
                ..
            } => Some(parent_directory_id),
            _ => None,
        }
    }

    pub fn location_id(&self) -> Option<&str> {
        match self {
            UploadRoute::Location(location) => Some(location),
            UploadRoute::ParentAndLocation { location_id, .. } => Some(location_id),
            _ => None,
        }
    }
}

/// Concrete request shape for one file: URL, credential, query parameters
/// and the optional notes field. The method is always POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    pub url: String,
    pub bearer_token: String,
    pub query: Vec<(String, String)>,
    pub notes: Option<String>,
    pub file: FileItem,
}

impl RequestTarget {
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.bearer_token)
    }
}

/// Resolve the request shape for uploading `file` under `config`.
///
/// The file name becomes the final path segment, preceded by the parent
/// directory ID when one is set. The location ID travels as the
/// `locationId` query parameter.
pub fn resolve_target(
    base_url: &str,
    config: &UploadConfig,
    file: &FileItem,
) -> Result<RequestTarget, UploadError> {
    if !config.is_authenticated() {
        return Err(UploadError::Configuration(
            "API key is not set".to_string(),
        ));
    }

    let base = base_url.trim_end_matches('/');
    let route = UploadRoute::from_config(config);
    let url = match route.parent_directory_id() {
        Some(parent) => format!("{}/{}/{}", base, parent, file.name),
        None => format!("{}/{}", base, file.name),
    };

    let mut query = Vec::new();
    if let Some(location) = route.location_id() {
        query.push(("locationId".to_string(), location.to_string()));
    }

    Ok(RequestTarget {
        url,
        bearer_token: config.api_key.clone(),
        query,
        notes: config.notes.clone(),
        file: file.clone(),
    })
}
