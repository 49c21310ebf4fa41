//! `AppConfig` struct and TOML read/write.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use cinefeed_feed::FeedConfig;
use cinefeed_feed::interleave::PROMOTION_INTERVAL;
use cinefeed_feed::spotlight::{FALLBACK_TERM, SPOTLIGHT_SIZE};
use serde::{Deserialize, Serialize};

/// Default catalog response language.
const DEFAULT_LANGUAGE: &str = "pt-BR";

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Catalog client settings.
    #[serde(default)]
    pub tmdb: TmdbSettings,
    /// Feed layout settings.
    #[serde(default)]
    pub feed: FeedSettings,
}

/// Catalog client configuration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TmdbSettings {
    /// Response language sent with every request.
    pub language: String,
    /// Overrides the TMDB API base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Minimum gap between two requests, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_interval_ms: Option<u64>,
}

impl Default for TmdbSettings {
    fn default() -> Self {
        Self {
            language: String::from(DEFAULT_LANGUAGE),
            base_url: None,
            min_interval_ms: None,
        }
    }
}

impl TmdbSettings {
    /// Configured request interval, if any.
    #[must_use]
    pub fn min_interval(&self) -> Option<Duration> {
        self.min_interval_ms.map(Duration::from_millis)
    }
}

/// Feed layout configuration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FeedSettings {
    /// Real movies between two spotlights (0 disables spotlights).
    pub promotion_interval: usize,
    /// Movies per spotlight.
    pub spotlight_size: usize,
    /// Search term used when franchise lookups fail.
    pub fallback_term: String,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            promotion_interval: PROMOTION_INTERVAL,
            spotlight_size: SPOTLIGHT_SIZE,
            fallback_term: String::from(FALLBACK_TERM),
        }
    }
}

impl FeedSettings {
    /// Builds the feed configuration, keeping the built-in franchise list.
    #[must_use]
    pub fn to_feed_config(&self) -> FeedConfig {
        FeedConfig {
            promotion_interval: self.promotion_interval,
            spotlight_size: self.spotlight_size,
            fallback_term: self.fallback_term.clone(),
            ..FeedConfig::default()
        }
    }
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }
}
