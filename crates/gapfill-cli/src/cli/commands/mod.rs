//! CLI command handlers, one file per command.

mod download;
mod run;
mod scan;
mod sites;
mod summary;

pub use download::run_download;
pub use run::run_scheduler;
pub use scan::run_scan;
pub use sites::run_sites;
pub use summary::run_summary;

use anyhow::Result;
use chrono::Utc;
use gapfill_core::config::GapfillConfig;
use gapfill_core::monitor::Monitor;
use gapfill_core::progress::ProgressFn;
use gapfill_core::reconcile::ScanResult;
use gapfill_core::site::{SiteConfig, SiteRegistry};
use std::sync::Arc;

pub(crate) fn open_registry(cfg: &GapfillConfig) -> Result<SiteRegistry> {
    SiteRegistry::load(&cfg.sites_path()?, &cfg.output_root)
}

/// All sites, or just `only` (error if it does not exist).
pub(crate) fn select_sites(registry: &SiteRegistry, only: Option<&str>) -> Result<Vec<Arc<SiteConfig>>> {
    match only {
        Some(name) => registry
            .get(name)
            .map(|s| vec![Arc::clone(s)])
            .ok_or_else(|| anyhow::anyhow!("site {:?} not found in {}", name, registry.path().display())),
        None => Ok(registry.sites().to_vec()),
    }
}

/// Progress lines go to stderr so stdout stays a clean report.
pub(crate) fn print_progress(msg: &str) {
    eprintln!("  {}", msg);
}

/// Scan `sites` on the blocking pool (connector calls block).
pub(crate) async fn scan_blocking(
    monitor: &Arc<Monitor>,
    sites: Vec<Arc<SiteConfig>>,
    days: u32,
) -> Result<ScanResult> {
    let monitor = Arc::clone(monitor);
    tokio::task::spawn_blocking(move || {
        let progress: ProgressFn<'_> = &print_progress;
        monitor.scan_sites(&sites, days, Utc::now(), Some(progress))
    })
    .await
    .map_err(|e| anyhow::anyhow!("scan task join: {}", e))
}
