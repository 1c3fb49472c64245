//! Application configuration for valleydocs.
//!
//! User config lives at `~/.valleydocs/valleydocs.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, ValleyDocsError};
use crate::types::{ContentMode, IconMode};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "valleydocs.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".valleydocs";

// ---------------------------------------------------------------------------
// Config structs (matching valleydocs.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Site being scraped.
    #[serde(default)]
    pub site: SiteConfig,

    /// Output locations and encodings.
    #[serde(default)]
    pub output: OutputConfig,

    /// HTTP fetch behaviour.
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL all site-relative paths are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Title of the synthetic root record.
    #[serde(default = "default_site_title")]
    pub title: String,

    /// Site-relative paths the crawl starts from, in output order.
    #[serde(default = "default_entry_pages")]
    pub entry_pages: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            title: default_site_title(),
            entry_pages: default_entry_pages(),
        }
    }
}

fn default_base_url() -> String {
    "https://thelivingvalley.earthbornegames.com".into()
}
fn default_site_title() -> String {
    "The Living Valley".into()
}
fn default_entry_pages() -> Vec<String> {
    [
        "/docs/category/campaign-guides",
        "/docs/rules_glossary",
        "/docs/one_day_missions",
        "/docs/category/updates",
        "/docs/faq",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for resource records and transcripts (cleared on each run).
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Directory for diagnostic dumps (cleared on each run).
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Directory for the persistent page cache.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    /// Icon rendering in markup output.
    #[serde(default)]
    pub icon_mode: IconMode,

    /// Encoding of record content.
    #[serde(default)]
    pub content_mode: ContentMode,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            log_dir: default_log_dir(),
            cache_dir: default_cache_dir(),
            icon_mode: IconMode::default(),
            content_mode: ContentMode::default(),
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_log_dir() -> String {
    "./log".into()
}
fn default_cache_dir() -> String {
    "./cache".into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total attempts per page, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff base in ms; attempt `n` waits `base * 2^(n-1)`.
    #[serde(default = "default_backoff_factor_ms")]
    pub backoff_factor_ms: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            backoff_factor_ms: default_backoff_factor_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff_factor(&self) -> Duration {
        Duration::from_millis(self.backoff_factor_ms)
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_max_attempts() -> u32 {
    6
}
fn default_backoff_factor_ms() -> u64 {
    2_000
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/75.0.3770.142 Safari/537.36".into()
}

// ---------------------------------------------------------------------------
// Scrape config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime scrape configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Parsed site base URL.
    pub base_url: Url,
    /// Title of the root record.
    pub site_title: String,
    /// Entry paths, crawled depth-first in order.
    pub entry_pages: Vec<String>,
    pub output_dir: PathBuf,
    pub log_dir: PathBuf,
    pub icon_mode: IconMode,
    pub content_mode: ContentMode,
}

impl TryFrom<&AppConfig> for ScrapeConfig {
    type Error = ValleyDocsError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let base_url = Url::parse(&config.site.base_url).map_err(|e| {
            ValleyDocsError::config(format!("invalid base_url {}: {e}", config.site.base_url))
        })?;

        if config.site.entry_pages.is_empty() {
            return Err(ValleyDocsError::config("no entry_pages configured"));
        }

        Ok(Self {
            base_url,
            site_title: config.site.title.clone(),
            entry_pages: config.site.entry_pages.clone(),
            output_dir: PathBuf::from(&config.output.output_dir),
            log_dir: PathBuf::from(&config.output.log_dir),
            icon_mode: config.output.icon_mode,
            content_mode: config.output.content_mode,
        })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.valleydocs/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ValleyDocsError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.valleydocs/valleydocs.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ValleyDocsError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ValleyDocsError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ValleyDocsError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ValleyDocsError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ValleyDocsError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
