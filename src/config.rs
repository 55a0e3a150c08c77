//! Configuration management for the dashboard.
//!
//! Loaded with figment from (later sources override earlier):
//! 1. Default values
//! 2. TOML file (`~/.config/ch-dashboard/ch-dashboard.toml` or an explicit path)
//! 3. Environment variables prefixed with `CH_` (`CH_API_KEY`, `CH_POLL_INTERVAL_MS`, ...)

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};
use crate::registry::DEFAULT_API_BASE;

const CONFIG_FILE_NAME: &str = "ch-dashboard.toml";
const APP_DIR_NAME: &str = "ch-dashboard";
const FOLLOWS_FILE_NAME: &str = "local-storage.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Registry API credential, sent as basic-auth username
    pub api_key: String,
    /// Registry API base URL
    pub api_base_url: String,
    /// Client poll interval; divided by 1000 it is the server revalidation window in seconds
    pub poll_interval_ms: u64,
    pub server: ServerConfig,
    pub dashboard: DashboardConfig,
    pub monitor: MonitorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Where `ch-server` is reachable from the dashboard
    pub server_url: String,
    /// Local store for the followed list; defaults under the data dir
    pub storage_path: Option<PathBuf>,
    /// Downloaded PDFs land here; defaults to the current directory
    pub download_dir: Option<PathBuf>,
    /// TUI log file; defaults under the data dir
    pub log_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub interval_secs: u64,
    /// Minimum gap between "no changes" log lines
    pub quiet_log_secs: u64,
    /// Snapshot directory; defaults under the data dir
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: DEFAULT_API_BASE.to_string(),
            poll_interval_ms: 600_000,
            server: ServerConfig::default(),
            dashboard: DashboardConfig::default(),
            monitor: MonitorConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3000".to_string(),
            storage_path: None,
            download_dir: None,
            log_path: None,
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            quiet_log_secs: 600,
            snapshot_dir: None,
        }
    }
}

impl Config {
    /// Load from defaults, the default TOML file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let config: Config = Self::figment(config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(config_file: PathBuf) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed("CH_").split("__"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(DashboardError::validation("poll_interval_ms must be greater than 0"));
        }
        if self.monitor.interval_secs == 0 {
            return Err(DashboardError::validation("monitor.interval_secs must be greater than 0"));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(DashboardError::validation("api_base_url must not be empty"));
        }
        Ok(())
    }

    /// Anything that talks to the registry directly needs a credential.
    pub fn require_api_key(&self) -> Result<&str> {
        if self.api_key.trim().is_empty() {
            return Err(DashboardError::validation(
                "api_key is not set (export CH_API_KEY or add it to ch-dashboard.toml)",
            ));
        }
        Ok(&self.api_key)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Server-side reuse window for registry responses.
    pub fn revalidate_window(&self) -> Duration {
        Duration::from_secs(self.poll_interval_ms / 1000)
    }

    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
    }

    pub fn storage_path(&self) -> PathBuf {
        self.dashboard
            .storage_path
            .clone()
            .unwrap_or_else(|| Self::data_dir().join(FOLLOWS_FILE_NAME))
    }

    pub fn download_dir(&self) -> PathBuf {
        self.dashboard
            .download_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn log_path(&self) -> PathBuf {
        self.dashboard
            .log_path
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("dashboard.log"))
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.monitor.snapshot_dir.clone().unwrap_or_else(Self::data_dir)
    }
}
