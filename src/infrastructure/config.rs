//! Configuration infrastructure
//!
//! Contains configuration loading and management for listing crawls.
//!
//! Configuration is organized into four sections:
//! 1. Logging
//! 2. Crawl pacing and scope
//! 3. HTTP client behaviour
//! 4. Extraction selectors

#![allow(clippy::uninlined_format_args)]

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::domain::constants::{site, validation};
use crate::infrastructure::parsing::ExtractionSelectors;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub crawling: CrawlingConfig,
    pub http: HttpConfig,
    pub selectors: ExtractionSelectors,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log file name inside the log directory
    pub file_name: String,

    /// Log files kept in the directory, current one included
    pub max_files: u32,

    /// Log directory; defaults to `logs/` next to the executable
    pub directory: Option<PathBuf>,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

/// Crawl scope and politeness settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlingConfig {
    /// Listing site base URL
    pub base_url: String,

    /// Index path of the crawled region
    pub region_path: String,

    /// Stop after this many index pages (`None`: until an empty page)
    pub max_pages: Option<u32>,

    /// Pause after each listing, in milliseconds
    pub listing_delay_ms: u64,

    /// Pause after each index page, in milliseconds
    pub page_delay_ms: u64,

    /// Random extra pause added to each delay, up to this many milliseconds
    pub jitter_ms: u64,

    /// CSV output file
    pub output_path: PathBuf,
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Attempts per URL before the page counts as failed
    pub max_retries: u32,
    pub follow_redirects: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            max_files: defaults::LOG_MAX_FILES,
            directory: None,
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "warn".to_string());
                filters.insert("selectors".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

impl Default for CrawlingConfig {
    fn default() -> Self {
        Self {
            base_url: site::BASE_URL.to_string(),
            region_path: site::REGION_PATH.to_string(),
            max_pages: None,
            listing_delay_ms: defaults::LISTING_DELAY_MS,
            page_delay_ms: defaults::PAGE_DELAY_MS,
            jitter_ms: defaults::JITTER_MS,
            output_path: PathBuf::from(defaults::OUTPUT_FILE),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_retries: defaults::MAX_RETRIES,
            follow_redirects: true,
        }
    }
}

impl CrawlingConfig {
    /// Index page URL; the first page has no page suffix
    pub fn index_page_url(&self, page: u32) -> String {
        let base = self.base_url.trim_end_matches('/');
        if page <= site::PAGE_NUMBERING_BASE {
            format!("{}{}", base, self.region_path)
        } else {
            format!("{}{}/{}", base, self.region_path, page)
        }
    }
}

impl AppConfig {
    /// Check user-editable values against the accepted ranges
    pub fn validate(&self) -> Result<()> {
        let crawling = &self.crawling;
        if let Some(max_pages) = crawling.max_pages {
            if max_pages == 0 || max_pages > validation::MAX_PAGE_RANGE {
                bail!("max_pages must be between 1 and {}, got {}", validation::MAX_PAGE_RANGE, max_pages);
            }
        }
        for (name, delay) in [
            ("listing_delay_ms", crawling.listing_delay_ms),
            ("page_delay_ms", crawling.page_delay_ms),
            ("jitter_ms", crawling.jitter_ms),
        ] {
            if delay > validation::MAX_REQUEST_DELAY_MS {
                bail!("{} must not exceed {} ms, got {}", name, validation::MAX_REQUEST_DELAY_MS, delay);
            }
        }
        if self.http.timeout_seconds == 0 {
            bail!("http.timeout_seconds must be positive");
        }
        if self.http.max_retries == 0 {
            bail!("http.max_retries must be at least 1");
        }
        url::Url::parse(&crawling.base_url)
            .with_context(|| format!("Invalid base_url: {}", crawling.base_url))?;
        Ok(())
    }
}

/// Loads and saves [`AppConfig`] as pretty JSON
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Configuration manager for the default per-user location
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    /// Configuration manager for an explicit file
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self { config_path: config_path.into() }
    }

    /// Load configuration; a missing file is created with defaults,
    /// an unreadable one is backed up and replaced
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path).await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("Configuration file could not be parsed: {}", parse_error);
                warn!("Resetting to default configuration");

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                self.reset_to_defaults().await
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await
                .context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(config)
            .context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content).await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Overwrite the file with defaults
    pub async fn reset_to_defaults(&self) -> Result<AppConfig> {
        let default_config = AppConfig::default();
        self.save_config(&default_config).await
            .context("Failed to save default configuration")?;

        info!("Configuration reset to defaults");
        Ok(default_config)
    }

    /// Path of the managed file
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Default configuration values
pub mod defaults {
    /// Directory name under the user config directory
    pub const APP_DIR_NAME: &str = "immo-annonces";

    /// Configuration file name
    pub const CONFIG_FILE_NAME: &str = "config.json";

    /// Default CSV output file
    pub const OUTPUT_FILE: &str = "annonces.csv";

    /// Default pause after each listing in milliseconds
    pub const LISTING_DELAY_MS: u64 = 1000;

    /// Default pause after each index page in milliseconds
    pub const PAGE_DELAY_MS: u64 = 2000;

    /// Default random jitter in milliseconds
    pub const JITTER_MS: u64 = 500;

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 15;

    /// Default attempts per URL
    pub const MAX_RETRIES: u32 = 2;

    /// Browser-like user agent; the site serves reduced markup to unknown agents
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    /// Default JSON format setting
    pub const LOG_JSON_FORMAT: bool = false;

    /// Default console output setting
    pub const LOG_CONSOLE_OUTPUT: bool = true;

    /// Default file output setting
    pub const LOG_FILE_OUTPUT: bool = true;

    /// Default log file name
    pub const LOG_FILE_NAME: &str = "immo-annonces.log";

    /// Default maximum log files to keep
    pub const LOG_MAX_FILES: u32 = 5;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_out_of_range_values() {
        let mut config = AppConfig::default();
        config.crawling.max_pages = Some(0);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.crawling.page_delay_ms = validation::MAX_REQUEST_DELAY_MS + 1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.crawling.base_url = "nowhere".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_index_page_urls() {
        let crawling = CrawlingConfig::default();
        assert_eq!(
            crawling.index_page_url(1),
            "https://www.immo-entre-particuliers.com/annonces/france-ile-de-france"
        );
        assert_eq!(
            crawling.index_page_url(3),
            "https://www.immo-entre-particuliers.com/annonces/france-ile-de-france/3"
        );
    }

    #[tokio::test]
    async fn test_missing_file_creates_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("nested").join("config.json"));

        let config = manager.load_config().await.unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(manager.config_path().exists());
    }

    #[tokio::test]
    async fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"crawling": {"max_pages": 3}}"#).unwrap();

        let config = ConfigManager::with_path(&path).load_config().await.unwrap();
        assert_eq!(config.crawling.max_pages, Some(3));
        assert_eq!(config.crawling.listing_delay_ms, defaults::LISTING_DELAY_MS);
        assert_eq!(config.http, HttpConfig::default());
    }

    #[tokio::test]
    async fn test_corrupted_file_is_backed_up_and_reset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let config = ConfigManager::with_path(&path).load_config().await.unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(dir.path().join("config.json.corrupted").exists());
    }
}
