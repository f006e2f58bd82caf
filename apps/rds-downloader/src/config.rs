// config.rs — Downloader configuration from rds-downloader.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use rds_fetcher::FetcherConfig;
use rds_lifecycle::LifecycleConfig;
use rds_persister::PersisterConfig;

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "rds-downloader.toml";

/// Top-level downloader configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Directory the persister paths are resolved against.
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,

    #[serde(default)]
    pub fetcher: FetcherConfig,

    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    #[serde(default)]
    pub persister: PersisterConfig,

    #[serde(default)]
    pub client: ClientConfig,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            fetcher: FetcherConfig::default(),
            lifecycle: LifecycleConfig::default(),
            persister: PersisterConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

/// Reference data service connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// JSON-RPC endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bearer token sent with every request.
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            api_token: None,
        }
    }
}

// Serde default functions
fn default_data_root() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("rds-downloader"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn default_endpoint() -> String {
    "http://localhost:8080/refdata".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl DownloaderConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Load config, returning defaults if the file doesn't exist.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Reject settings the downloader cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.lifecycle
            .interval_duration()
            .context("invalid [lifecycle] settings")?;
        if self.client.endpoint.trim().is_empty() {
            anyhow::bail!("[client] endpoint must not be empty");
        }
        if self.client.timeout_secs == 0 {
            anyhow::bail!("[client] timeout_secs must be greater than zero");
        }
        Ok(())
    }
}
