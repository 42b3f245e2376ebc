//! Monitored sites: typed configuration plus the persisted record form.
//!
//! `SiteRecord` is what lives in `sites.json` (field names match the legacy
//! file). `SiteConfig` is the resolved, validated form the engine works with:
//! protocol and frequency are parsed case-insensitively, the port is filled in
//! from the protocol and the output directory from the configured root.

mod registry;

pub use registry::SiteRegistry;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SiteError {
    #[error("site name must not be empty")]
    EmptyName,
    #[error("site {0}: host must not be empty")]
    EmptyHost(String),
    #[error("unknown protocol {0:?} (expected ftp or sftp)")]
    UnknownProtocol(String),
    #[error("unknown frequency {0:?} (expected daily or hourly)")]
    UnknownFrequency(String),
}

/// Transport used to reach a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Ftp,
    Sftp,
}

impl Protocol {
    pub fn default_port(self) -> u16 {
        match self {
            Protocol::Ftp => 21,
            Protocol::Sftp => 22,
        }
    }

    pub fn scheme(self) -> &'static str {
        match self {
            Protocol::Ftp => "ftp",
            Protocol::Sftp => "sftp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

impl FromStr for Protocol {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ftp" => Ok(Protocol::Ftp),
            "sftp" => Ok(Protocol::Sftp),
            _ => Err(SiteError::UnknownProtocol(s.to_string())),
        }
    }
}

/// Publication cadence of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Hourly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Hourly => "hourly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "hourly" => Ok(Frequency::Hourly),
            _ => Err(SiteError::UnknownFrequency(s.to_string())),
        }
    }
}

fn default_frequency() -> String {
    "daily".to_string()
}

fn default_network() -> String {
    "NOA".to_string()
}

fn default_rate() -> String {
    "30s".to_string()
}

fn default_format() -> String {
    "Topcon".to_string()
}

/// One entry of `sites.json`, exactly as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub name: String,
    pub host: String,
    pub protocol: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub pattern: String,
    #[serde(default = "default_frequency")]
    pub frequency: String,
    #[serde(default = "default_network")]
    pub network: String,
    #[serde(default = "default_rate")]
    pub rate: String,
    #[serde(default)]
    pub external_clock: bool,
    #[serde(default)]
    pub use_letter_hour: bool,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub station_code: String,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub port: Option<u16>,
}

impl SiteRecord {
    /// A record with the legacy defaults for every optional field.
    pub fn new(name: &str, host: &str, protocol: &str) -> Self {
        Self {
            name: name.to_string(),
            host: host.to_string(),
            protocol: protocol.to_string(),
            user: String::new(),
            password: String::new(),
            path: String::new(),
            pattern: String::new(),
            frequency: default_frequency(),
            network: default_network(),
            rate: default_rate(),
            external_clock: false,
            use_letter_hour: false,
            output_dir: None,
            station_code: String::new(),
            format: default_format(),
            port: None,
        }
    }
}

/// A validated site. Immutable while a scan runs; shared as `Arc<SiteConfig>`.
#[derive(Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub name: String,
    pub host: String,
    pub protocol: Protocol,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub remote_path: String,
    /// strftime-style filename template, e.g. `SITE%Y%m%d%H.dat`.
    pub pattern: String,
    pub frequency: Frequency,
    pub network: String,
    pub sample_rate: String,
    pub external_clock: bool,
    pub letter_hour: bool,
    pub output_dir: PathBuf,
    pub station_code: String,
    pub data_format: String,
}

// Hand-written so the password never reaches logs.
impl fmt::Debug for SiteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteConfig")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("protocol", &self.protocol)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("remote_path", &self.remote_path)
            .field("pattern", &self.pattern)
            .field("frequency", &self.frequency)
            .field("letter_hour", &self.letter_hour)
            .field("output_dir", &self.output_dir)
            .finish_non_exhaustive()
    }
}

impl SiteConfig {
    /// Resolve a record: parse protocol/frequency, default the port by protocol and
    /// the output directory to `<output_root>/<name>`.
    pub fn from_record(record: SiteRecord, output_root: &Path) -> Result<Self, SiteError> {
        let name = record.name.trim().to_string();
        if name.is_empty() {
            return Err(SiteError::EmptyName);
        }
        let host = record.host.trim().to_string();
        if host.is_empty() {
            return Err(SiteError::EmptyHost(name));
        }
        let protocol: Protocol = record.protocol.parse()?;
        let frequency: Frequency = record.frequency.parse()?;
        let port = record.port.unwrap_or_else(|| protocol.default_port());
        let output_dir = record
            .output_dir
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| output_root.join(&name));

        Ok(Self {
            name,
            host,
            protocol,
            port,
            user: record.user,
            password: record.password,
            remote_path: record.path,
            pattern: record.pattern,
            frequency,
            network: record.network,
            sample_rate: record.rate,
            external_clock: record.external_clock,
            letter_hour: record.use_letter_hour,
            output_dir,
            station_code: record.station_code,
            data_format: record.format,
        })
    }

    /// Back to the persisted form. Port and output directory are written out resolved.
    pub fn to_record(&self) -> SiteRecord {
        SiteRecord {
            name: self.name.clone(),
            host: self.host.clone(),
            protocol: self.protocol.to_string(),
            user: self.user.clone(),
            password: self.password.clone(),
            path: self.remote_path.clone(),
            pattern: self.pattern.clone(),
            frequency: self.frequency.to_string(),
            network: self.network.clone(),
            rate: self.sample_rate.clone(),
            external_clock: self.external_clock,
            use_letter_hour: self.letter_hour,
            output_dir: Some(self.output_dir.clone()),
            station_code: self.station_code.clone(),
            format: self.data_format.clone(),
            port: Some(self.port),
        }
    }

    /// Rate label as shown in summaries, e.g. `30s [ExtClk]`.
    pub fn rate_label(&self) -> String {
        if self.external_clock {
            format!("{} [ExtClk]", self.sample_rate)
        } else {
            self.sample_rate.clone()
        }
    }
}
