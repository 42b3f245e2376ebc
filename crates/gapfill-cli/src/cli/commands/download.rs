//! `gapfill download` – scan, then fetch every missing or mismatched file.

use anyhow::Result;
use gapfill_core::config::GapfillConfig;
use gapfill_core::monitor::Monitor;
use gapfill_core::progress::ProgressFn;
use std::sync::Arc;

use super::{open_registry, print_progress, scan_blocking, select_sites};
use super::scan::print_scan;

pub async fn run_download(cfg: &GapfillConfig, days: u32, site: Option<&str>) -> Result<()> {
    let registry = open_registry(cfg)?;
    let sites = select_sites(&registry, site)?;
    if sites.is_empty() {
        println!("No sites configured. Add one with `gapfill sites add`.");
        return Ok(());
    }
    let monitor = Arc::new(Monitor::from_config(cfg, sites.clone())?);
    let mut result = scan_blocking(&monitor, sites, days).await?;

    let (result, report) = tokio::task::spawn_blocking(move || {
        let progress: ProgressFn<'_> = &print_progress;
        let report = monitor.download_missing(&mut result, Some(progress));
        (result, report)
    })
    .await
    .map_err(|e| anyhow::anyhow!("download task join: {}", e))?;

    print_scan(&result, true);
    if report.attempted == 0 {
        println!("Nothing to download.");
    } else {
        println!(
            "Downloaded {}/{} file(s), {} failed.",
            report.succeeded, report.attempted, report.failed
        );
    }
    if report.failed > 0 {
        anyhow::bail!("{} download(s) failed (see log)", report.failed);
    }
    Ok(())
}
