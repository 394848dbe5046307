use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One local filesystem entry, as produced by the directory listing provider
/// or built directly from a path passed on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileItem {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
}

impl FileItem {
    pub fn new(path: impl Into<PathBuf>, size: u64, is_directory: bool) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            name,
            size,
            is_directory,
        }
    }

    /// Build a `FileItem` from path metadata. Directories report size 0.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        let is_directory = metadata.is_dir();
        let size = if is_directory { 0 } else { metadata.len() };
        Ok(Self::new(path.to_path_buf(), size, is_directory))
    }

    /// Human-readable size, e.g. `2.5 MB`. Directories render as `DIR`.
    pub fn human_size(&self) -> String {
        if self.is_directory {
            return "DIR".to_string();
        }
        let mut size = self.size as f64;
        for unit in ["B", "KB", "MB", "GB", "TB"] {
            if size < 1024.0 {
                return format!("{:.1} {}", size, unit);
            }
            size /= 1024.0;
        }
        format!("{:.1} PB", size)
    }
}
