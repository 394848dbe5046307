//! Persisted upload settings.
//!
//! Stored as JSON under the user config directory
//! (`~/.config/buzzup/settings.json` on Linux). The API key may also come
//! from the `BUZZHEAVIER_API_KEY` environment variable; a persisted key
//! wins over the environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use buzzup_core::config::API_KEY_ENV;
use buzzup_core::UploadConfig;

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub parent_directory_id: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Settings {
    pub fn path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not determine the user config directory")?;
        Ok(dir.join("buzzup").join(SETTINGS_FILE))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Missing file means first run: defaults. An unreadable or invalid
    /// file is an error rather than silently dropping saved settings.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)
            .with_context(|| format!("Failed to write settings: {}", path.display()))?;
        Ok(())
    }

    /// Build the per-batch config: persisted values with the environment as
    /// API key fallback. Blank strings count as unset.
    pub fn upload_config(&self) -> UploadConfig {
        self.upload_config_with_env(std::env::var(API_KEY_ENV).ok())
    }

    fn upload_config_with_env(&self, env_api_key: Option<String>) -> UploadConfig {
        let api_key = non_blank(self.api_key.clone())
            .or_else(|| non_blank(env_api_key))
            .unwrap_or_default();
        UploadConfig {
            api_key,
            parent_directory_id: non_blank(self.parent_directory_id.clone()),
            location_id: non_blank(self.location_id.clone()),
            notes: non_blank(self.notes.clone()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("settings.json")).unwrap();
        assert!(settings.api_key.is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            api_key: Some("key123".to_string()),
            parent_directory_id: Some("dir456".to_string()),
            location_id: None,
            notes: Some("hello".to_string()),
        };
        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("key123"));
        assert_eq!(loaded.parent_directory_id.as_deref(), Some("dir456"));
        assert_eq!(loaded.notes.as_deref(), Some("hello"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }

    #[test]
    fn test_persisted_key_wins_over_environment() {
        let settings = Settings {
            api_key: Some("persisted".to_string()),
            ..Default::default()
        };
        let config = settings.upload_config_with_env(Some("from-env".to_string()));
        assert_eq!(config.api_key, "persisted");
    }

    #[test]
    fn test_environment_fallback_for_api_key() {
        let settings = Settings::default();
        let config = settings.upload_config_with_env(Some("from-env".to_string()));
        assert_eq!(config.api_key, "from-env");
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let settings = Settings {
            api_key: Some("  ".to_string()),
            parent_directory_id: Some("".to_string()),
            ..Default::default()
        };
        let config = settings.upload_config_with_env(None);
        assert!(!config.is_authenticated());
        assert!(config.parent_directory_id.is_none());
    }
}
