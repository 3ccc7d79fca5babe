//! User configuration loaded from `~/.config/saavn-rs/config.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://saavn.sumit.co/api";
pub const DEFAULT_QUERY: &str = "arijit";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

/// Search endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Query used for the unfiltered catalog listing
    pub default_query: String,
    pub page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_query: DEFAULT_QUERY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// Linear output gain, 1.0 is unchanged
    pub volume: f32,
    /// Upper bound for fetching one song, body included
    pub download_timeout_secs: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: 1.0,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        }
    }
}

impl AudioConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content).context("Invalid config file")?;
        config.normalize();
        Ok(config)
    }

    fn normalize(&mut self) {
        if self.api.page_size == 0 {
            self.api.page_size = DEFAULT_PAGE_SIZE;
        }
        self.api.base_url = self.api.base_url.trim_end_matches('/').to_string();
        self.audio.volume = self.audio.volume.clamp(0.0, 2.0);
        if self.audio.download_timeout_secs == 0 {
            self.audio.download_timeout_secs = DEFAULT_DOWNLOAD_TIMEOUT_SECS;
        }
    }
}

pub fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".config")
        .join("saavn-rs")
        .join("config.toml")
}

/// Load the config file, falling back to defaults when it is missing or unreadable.
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return Config::default();
    }
    let loaded = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))
        .and_then(|content| Config::parse(&content));
    match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring config file");
            Config::default()
        }
    }
}
