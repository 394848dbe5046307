//! Configuration: per-batch upload settings and service-level client
//! settings, the latter overridable through environment variables.

use std::env;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_UPLOAD_URL: &str = "https://w.buzzheavier.com";
const DEFAULT_SHARE_URL: &str = "https://buzzheavier.com";
const DEFAULT_MAX_CONCURRENT: usize = 4;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TRANSFER_TIMEOUT_SECS: u64 = 3600;

/// Name of the environment variable that may supply the API key when no
/// persisted credential exists.
pub const API_KEY_ENV: &str = "BUZZHEAVIER_API_KEY";

/// Where and how one batch is uploaded. Built once per batch from persisted
/// settings plus command-line overrides, then immutable for its duration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadConfig {
    pub api_key: String,
    /// Target directory on the service; becomes a path segment of the
    /// upload URL when set.
    pub parent_directory_id: Option<String>,
    /// Storage location hint; passed as the `locationId` query parameter.
    pub location_id: Option<String>,
    /// Free-form note attached to every file in the batch.
    pub notes: Option<String>,
}

impl UploadConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// True when a non-blank credential is present.
    pub fn is_authenticated(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Service endpoints and transfer limits.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub upload_url: String,
    pub share_url: String,
    /// Upper bound on simultaneous transfers, always at least 1.
    pub max_concurrent: usize,
    pub connect_timeout: Duration,
    /// Total per-request budget; a stalled transfer fails its task instead
    /// of hanging the batch.
    pub transfer_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            share_url: DEFAULT_SHARE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            transfer_timeout: Duration::from_secs(DEFAULT_TRANSFER_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Load from the environment, falling back to defaults:
    /// `BUZZUP_UPLOAD_URL`, `BUZZUP_SHARE_URL`, `BUZZUP_MAX_CONCURRENT`,
    /// `BUZZUP_CONNECT_TIMEOUT_SECS`, `BUZZUP_TRANSFER_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            upload_url: env_url("BUZZUP_UPLOAD_URL", &defaults.upload_url),
            share_url: env_url("BUZZUP_SHARE_URL", &defaults.share_url),
            max_concurrent: env_parsed("BUZZUP_MAX_CONCURRENT", defaults.max_concurrent),
            connect_timeout: Duration::from_secs(env_parsed(
                "BUZZUP_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
            transfer_timeout: Duration::from_secs(env_parsed(
                "BUZZUP_TRANSFER_TIMEOUT_SECS",
                DEFAULT_TRANSFER_TIMEOUT_SECS,
            )),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent == 0 {
            bail!("BUZZUP_MAX_CONCURRENT must be at least 1");
        }
        for (name, url) in [
            ("BUZZUP_UPLOAD_URL", &self.upload_url),
            ("BUZZUP_SHARE_URL", &self.share_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("{} must be an http(s) URL, got: {}", name, url);
            }
        }
        Ok(())
    }
}

fn env_url(key: &str, default: &str) -> String {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
