//! Configuration management for Clearpath.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/clearpath/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Job/result store settings
    pub store: StoreConfig,
    /// Search fan-out settings
    pub search: SearchConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Text interpretation settings
    pub llm: LlmConfig,
    /// Source definitions and credentials
    pub sources: SourcesConfig,
    /// Entity detail lookups
    pub detail: DetailConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, falling back to defaults if absent.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `ANTHROPIC_API_KEY`: API key for the interpretation capability
    /// - `CA_SOS_API_KEY`: California subscription key (stored as a source credential)
    /// - `CLEARPATH_DATABASE_PATH`: Override the SQLite database path
    /// - `CLEARPATH_HEADLESS`: Override browser headless mode (true/false)
    /// - `CLEARPATH_LLM_ENABLED`: Override LLM enabled status (true/false)
    /// - `CLEARPATH_SOURCE_TIMEOUT_SECS`: Override the per-source budget
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup function.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("ANTHROPIC_API_KEY").filter(|k| !k.is_empty()) {
            self.llm.api_key = Some(key);
            tracing::debug!("Override llm.api_key from env");
        }

        if let Some(key) = lookup("CA_SOS_API_KEY").filter(|k| !k.is_empty()) {
            self.sources
                .credentials
                .insert("CA_SOS_API_KEY".to_string(), key);
            tracing::debug!("Override sources.credentials.CA_SOS_API_KEY from env");
        }

        if let Some(path) = lookup("CLEARPATH_DATABASE_PATH") {
            tracing::debug!("Override store.database_path from env: {}", path);
            self.store.database_path = Some(PathBuf::from(path));
        }

        if let Some(val) = lookup("CLEARPATH_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(val) = lookup("CLEARPATH_LLM_ENABLED") {
            if let Ok(enabled) = val.parse() {
                self.llm.enabled = enabled;
                tracing::debug!("Override llm.enabled from env: {}", enabled);
            }
        }

        if let Some(val) = lookup("CLEARPATH_SOURCE_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.search.source_timeout_secs = secs;
                tracing::debug!("Override search.source_timeout_secs from env: {}", secs);
            }
        }
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.search.source_timeout_secs == 0 {
            return Err(invalid("search.source_timeout_secs", "must be greater than 0"));
        }
        if self.search.similarity_name_limit == 0 {
            return Err(invalid("search.similarity_name_limit", "must be greater than 0"));
        }
        if self.search.page_excerpt_chars == 0 {
            return Err(invalid("search.page_excerpt_chars", "must be greater than 0"));
        }
        if self.browser.pool_size == 0 {
            return Err(invalid("browser.pool_size", "must be greater than 0"));
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/clearpath/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/clearpath`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        Ok(project_dirs()?.data_dir().to_path_buf())
    }

    /// Database path: the configured one, or `clearpath.db` in the data directory.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        match &self.store.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("clearpath.db")),
        }
    }
}

fn project_dirs() -> ConfigResult<ProjectDirs> {
    ProjectDirs::from("com", "clearpath", "clearpath").ok_or(ConfigError::NoConfigDir)
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Job/result store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database path (defaults to the data directory)
    pub database_path: Option<PathBuf>,
}

/// Search fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Wall-clock budget per source in seconds
    pub source_timeout_secs: u64,
    /// Sources used when a request names none
    pub default_sources: Vec<String>,
    /// Maximum similar names sent for similarity analysis
    pub similarity_name_limit: usize,
    /// Characters of page text sent for interpretation
    pub page_excerpt_chars: usize,
}

impl SearchConfig {
    /// Per-source budget as a `Duration`.
    #[must_use]
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            source_timeout_secs: 90,
            default_sources: ["DE", "NY", "CA", "FL", "NJ", "WA"]
                .into_iter()
                .map(String::from)
                .collect(),
            similarity_name_limit: 10,
            page_excerpt_chars: 3000,
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Maximum concurrently running browser instances
    pub pool_size: usize,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// Timeout for each candidate selector in milliseconds
    pub selector_timeout_ms: u64,
    /// Maximum wait for the page to settle after submitting, in milliseconds
    pub settle_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            pool_size: 3,
            navigation_timeout_secs: 30,
            selector_timeout_ms: 5_000,
            settle_timeout_ms: 15_000,
        }
    }
}

/// Text interpretation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Whether the interpretation capability is used
    pub enabled: bool,
    /// Anthropic API key (taken from the environment, never written to disk)
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Model for ambiguous page interpretation
    pub page_model: String,
    /// Model for similarity risk analysis
    pub similarity_model: String,
    /// Token cap for page interpretation
    pub page_max_tokens: u32,
    /// Token cap for similarity analysis
    pub similarity_max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            page_model: "claude-haiku-4-5-20251001".to_string(),
            similarity_model: "claude-sonnet-4-6".to_string(),
            page_max_tokens: 300,
            similarity_max_tokens: 400,
            timeout_secs: 60,
        }
    }
}

/// Source definitions and credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Directory of extra/overriding source definition files
    pub definitions_dir: Option<PathBuf>,
    /// Named credentials referenced by source definitions (never written to disk)
    #[serde(skip_serializing)]
    pub credentials: BTreeMap<String, String>,
}

/// Entity detail lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailConfig {
    /// `OpenCorporates` API base URL
    pub opencorporates_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            opencorporates_url: "https://api.opencorporates.com/v0.4".to_string(),
            timeout_secs: 15,
        }
    }
}
