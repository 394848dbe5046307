//! Directory listing provider.
//!
//! Produces the ordered file sequence the uploader consumes: directories
//! first, then case-insensitive name order. Entries whose metadata cannot
//! be read are skipped.

use std::path::Path;

use anyhow::{Context, Result};

use buzzup_core::FileItem;

pub fn list_directory(path: &Path, filter: Option<&str>) -> Result<Vec<FileItem>> {
    let entries = std::fs::read_dir(path)
        .with_context(|| format!("Failed to read directory: {}", path.display()))?;
    let needle = filter.map(str::to_lowercase);

    let mut items = Vec::new();
    for entry in entries.flatten() {
        let Ok(item) = FileItem::from_path(entry.path()) else {
            continue;
        };
        if let Some(needle) = &needle {
            if !item.name.to_lowercase().contains(needle) {
                continue;
            }
        }
        items.push(item);
    }
    items.sort_by_key(|item| (!item.is_directory, item.name.to_lowercase()));
    Ok(items)
}
