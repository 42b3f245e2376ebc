#![allow(dead_code)]

pub mod fake_remote;
pub mod ftp_server;

use chrono::{DateTime, TimeZone, Utc};
use std::path::Path;
use std::sync::Arc;

use gapfill_core::connector::Connectors;
use gapfill_core::monitor::{Monitor, MonitorSettings};
use gapfill_core::retry::RetryPolicy;
use gapfill_core::site::{SiteConfig, SiteRecord};

pub use fake_remote::FakeRemote;

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

/// FTP site writing into `<root>/<name>`.
pub fn site(name: &str, pattern: &str, frequency: &str, root: &Path) -> Arc<SiteConfig> {
    let mut rec = SiteRecord::new(name, "gnss.example.org", "ftp");
    rec.pattern = pattern.to_string();
    rec.frequency = frequency.to_string();
    rec.path = "/pub/data".to_string();
    Arc::new(SiteConfig::from_record(rec, root).expect("valid site"))
}

pub fn letter_hour_site(name: &str, pattern: &str, root: &Path) -> Arc<SiteConfig> {
    let mut rec = SiteRecord::new(name, "gnss.example.org", "sftp");
    rec.pattern = pattern.to_string();
    rec.frequency = "hourly".to_string();
    rec.use_letter_hour = true;
    Arc::new(SiteConfig::from_record(rec, root).expect("valid site"))
}

/// Both protocols served by the same fake remote.
pub fn connectors(remote: &Arc<FakeRemote>) -> Connectors {
    Connectors::new(remote.clone(), remote.clone())
}

/// Monitor over `remote` with three zero-delay attempts per call.
pub fn monitor(sites: Vec<Arc<SiteConfig>>, remote: &Arc<FakeRemote>, settings: MonitorSettings) -> Monitor {
    Monitor::new(sites, connectors(remote), RetryPolicy::immediate(3), settings)
}
