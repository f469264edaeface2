//! Configuration structures and loading logic.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::api::{AssetUrlFailurePolicy, BackoffStrategy, RetryPolicy};
use crate::error::{Error, Result};

/// Config file name looked up in the working and platform config directories.
pub const CONFIG_FILE_NAME: &str = "icloud-album.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// HTTP client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default)]
    pub strategy: BackoffStrategy,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Statuses retried in addition to any 5xx.
    #[serde(default = "default_retryable_codes")]
    pub retryable_codes: Vec<u16>,

    /// Statuses that fail immediately.
    #[serde(default = "default_permanent_codes")]
    pub permanent_codes: Vec<u16>,
}

/// Download options configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Base directory for downloads.
    #[serde(default)]
    pub download_directory: Option<PathBuf>,

    /// Whether to put each album in its own folder.
    #[serde(default = "default_true")]
    pub album_subfolder: bool,

    /// Number of photos downloaded at once.
    #[serde(default = "default_concurrent_downloads")]
    pub concurrent_downloads: usize,

    /// What to do when asset URLs cannot be fetched.
    #[serde(default)]
    pub asset_url_failure: AssetUrlFailurePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            strategy: BackoffStrategy::default(),
            max_delay_ms: default_max_delay_ms(),
            retryable_codes: default_retryable_codes(),
            permanent_codes: default_permanent_codes(),
        }
    }
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            download_directory: None,
            album_subfolder: true,
            concurrent_downloads: default_concurrent_downloads(),
            asset_url_failure: AssetUrlFailurePolicy::default(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("icloud-album/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_retryable_codes() -> Vec<u16> {
    vec![408, 429, 500, 502, 503, 504]
}

fn default_permanent_codes() -> Vec<u16> {
    vec![400, 401, 403, 404]
}

fn default_true() -> bool {
    true
}

fn default_concurrent_downloads() -> usize {
    1
}

impl RetryConfig {
    /// Convert into the policy used by the request executor.
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
            strategy: self.strategy,
            max_delay: Duration::from_millis(self.max_delay_ms),
            retryable_codes: self.retryable_codes.clone(),
            permanent_codes: self.permanent_codes.clone(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from an explicit path, or the first config file found, or defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match Self::locate() {
            Some(path) => {
                tracing::debug!("Using config file {}", path.display());
                Self::load(&path)
            }
            None => {
                tracing::debug!("No config file found; using defaults");
                Ok(Self::default())
            }
        }
    }

    /// First existing config file: working directory, then platform config dir.
    pub fn locate() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }

        Self::platform_config_path().filter(|path| path.is_file())
    }

    /// Config file path in the platform config directory.
    pub fn platform_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "icloud-album", "icloud-album")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the effective download directory.
    pub fn download_directory(&self) -> PathBuf {
        self.options
            .download_directory
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}
