use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per remote call (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff.
    pub base_delay_secs: f64,
    /// Growth factor applied to the delay after each failed attempt.
    pub multiplier: u32,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1.0,
            multiplier: 2,
            max_delay_secs: 60,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        let base = if self.base_delay_secs.is_finite() && self.base_delay_secs > 0.0 {
            Duration::from_secs_f64(self.base_delay_secs)
        } else {
            Duration::ZERO
        };
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: base,
            multiplier: self.multiplier.max(1),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Connect and read (stall) timeouts applied to every FTP/SFTP call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub connect_secs: u64,
    /// A transfer that moves no data for this long is aborted.
    pub read_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 30,
            read_secs: 60,
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }
}

/// When the scheduler fires: `offset_minutes` past every hour, checked every `tick_secs`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub offset_minutes: u32,
    pub tick_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            offset_minutes: 15,
            tick_secs: 1,
        }
    }
}

impl ScheduleConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_secs.max(1))
    }
}

/// Global configuration loaded from `~/.config/gapfill/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapfillConfig {
    /// How many UTC days (including today) each scan covers.
    pub days_back: u32,
    /// Automatic downloads skip files whose slot is younger than this.
    pub grace_minutes: u32,
    /// Parent of per-site output directories when a site sets none.
    pub output_root: PathBuf,
    /// Site list location; defaults to `sites.json` next to config.toml.
    #[serde(default)]
    pub sites_file: Option<PathBuf>,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for GapfillConfig {
    fn default() -> Self {
        Self {
            days_back: 1,
            grace_minutes: 15,
            output_root: PathBuf::from("./downloads"),
            sites_file: None,
            schedule: ScheduleConfig::default(),
            timeouts: TimeoutConfig::default(),
            retry: None,
        }
    }
}

impl GapfillConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    /// Resolved site list path (explicit `sites_file` or the XDG default).
    pub fn sites_path(&self) -> Result<PathBuf> {
        match &self.sites_file {
            Some(p) => Ok(p.clone()),
            None => default_sites_path(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("gapfill")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

pub fn default_sites_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("gapfill")?;
    Ok(xdg_dirs.place_config_file("sites.json")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GapfillConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GapfillConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: GapfillConfig = toml::from_str(&data)?;
    Ok(cfg)
}
