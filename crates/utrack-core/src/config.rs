use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::notify::SocketTransport;
use crate::poll::{HttpStatusQuery, PollSettings};

/// Poll channel parameters (`[poll]` in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Delay between a status response and the next query, in milliseconds.
    pub interval_ms: u64,
    /// Delay before the first query; defaults to `interval_ms` when absent.
    #[serde(default)]
    pub initial_delay_ms: Option<u64>,
    /// Successful non-terminal responses tolerated before the job times out.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            initial_delay_ms: None,
            max_attempts: 150,
        }
    }
}

impl PollConfig {
    pub fn settings(&self) -> PollSettings {
        let mut settings = PollSettings::new(Duration::from_millis(self.interval_ms), self.max_attempts);
        if let Some(ms) = self.initial_delay_ms {
            settings.initial_delay = Duration::from_millis(ms);
        }
        settings
    }
}

/// Status endpoint timeouts (`[http]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            timeout_secs: 30,
        }
    }
}

/// Push channel settings (`[notify]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub connect_timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
        }
    }
}

/// Global configuration loaded from `~/.config/utrack/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Base URL of the job status endpoint; the job id is appended as a path segment.
    pub status_base_url: String,
    /// Default push channel address (`host:port`) when a job does not name one.
    #[serde(default)]
    pub notification_address: Option<String>,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            status_base_url: "http://127.0.0.1:8080/api/jobs/".to_string(),
            notification_address: None,
            poll: PollConfig::default(),
            http: HttpConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.poll.interval_ms == 0 {
            bail!("poll.interval_ms must be greater than zero");
        }
        if self.poll.max_attempts == 0 {
            bail!("poll.max_attempts must be at least 1");
        }
        let base = url::Url::parse(&self.status_base_url)
            .with_context(|| format!("invalid status_base_url {:?}", self.status_base_url))?;
        if base.cannot_be_a_base() {
            bail!("status_base_url must be a hierarchical URL: {}", self.status_base_url);
        }
        Ok(())
    }

    pub fn status_query(&self) -> Result<HttpStatusQuery> {
        let base = url::Url::parse(&self.status_base_url)
            .with_context(|| format!("invalid status_base_url {:?}", self.status_base_url))?;
        Ok(HttpStatusQuery::new(
            base,
            Duration::from_secs(self.http.connect_timeout_secs),
            Duration::from_secs(self.http.timeout_secs),
        ))
    }

    pub fn transport(&self) -> SocketTransport {
        SocketTransport::new(Duration::from_secs(self.notify.connect_timeout_secs))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("utrack")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TrackerConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<TrackerConfig> {
    if !path.exists() {
        let default_cfg = TrackerConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: TrackerConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
