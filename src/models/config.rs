// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Storefront endpoint settings
    #[serde(default)]
    pub storefront: StorefrontConfig,

    /// HTTP and scraping behavior settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Monitor run behavior
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Telegram delivery settings
    #[serde(default)]
    pub telegram: TelegramConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.storefront.base_url.trim().is_empty() {
            return Err(AppError::validation("storefront.base_url is empty"));
        }
        if url::Url::parse(&self.storefront.base_url).is_err() {
            return Err(AppError::validation(format!(
                "storefront.base_url is not a valid URL: {}",
                self.storefront.base_url
            )));
        }
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        if self.scraper.max_concurrent == 0 {
            return Err(AppError::validation("scraper.max_concurrent must be > 0"));
        }
        if self.monitor.scan_interval_secs == 0 {
            return Err(AppError::validation("monitor.scan_interval_secs must be > 0"));
        }
        Ok(())
    }
}

/// Storefront endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Base URL of the storefront (the cart pages live under `/cart`)
    #[serde(default = "defaults::base_url")]
    pub base_url: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
        }
    }
}

/// HTTP client and scraping behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum concurrent region fetches
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Monitor run behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between passes in `watch` mode
    #[serde(default = "defaults::scan_interval")]
    pub scan_interval_secs: u64,

    /// Withhold a `gid=1` region's events from the digest when its
    /// snapshot equals the product type's default region snapshot
    #[serde(default = "defaults::suppress_mirrored_zone")]
    pub suppress_mirrored_zone: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: defaults::scan_interval(),
            suppress_mirrored_zone: defaults::suppress_mirrored_zone(),
        }
    }
}

/// Telegram delivery settings.
///
/// Both fields may instead come from the `TG_TOKEN` / `TG_CHAT_ID`
/// environment variables, which take precedence over the file values.
/// With neither configured, delivery falls back to console output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub chat_id: Option<String>,
}

impl TelegramConfig {
    /// Resolve credentials, preferring environment variables.
    pub fn resolve(&self) -> Option<(String, String)> {
        let token = std::env::var("TG_TOKEN")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.token.clone().filter(|s| !s.is_empty()))?;
        let chat_id = std::env::var("TG_CHAT_ID")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.chat_id.clone().filter(|s| !s.is_empty()))?;
        Some((token, chat_id))
    }
}

/// Default values for configuration fields.
mod defaults {
    pub fn base_url() -> String {
        "https://cloud.zrvvv.com".to_string()
    }

    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string()
    }

    pub fn timeout() -> u64 {
        10
    }

    pub fn request_delay() -> u64 {
        200
    }

    pub fn max_concurrent() -> usize {
        4
    }

    pub fn scan_interval() -> u64 {
        300
    }

    pub fn suppress_mirrored_zone() -> bool {
        true
    }
}
