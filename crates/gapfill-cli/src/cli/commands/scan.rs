//! `gapfill scan` – classify expected files without downloading.

use anyhow::Result;
use gapfill_core::config::GapfillConfig;
use gapfill_core::monitor::Monitor;
use gapfill_core::reconcile::{FileStatus, ScanResult};
use gapfill_core::summary::format_size;
use std::sync::Arc;

use super::{open_registry, scan_blocking, select_sites};

pub async fn run_scan(cfg: &GapfillConfig, days: u32, site: Option<&str>, issues: bool) -> Result<()> {
    let registry = open_registry(cfg)?;
    let sites = select_sites(&registry, site)?;
    if sites.is_empty() {
        println!("No sites configured. Add one with `gapfill sites add`.");
        return Ok(());
    }
    let monitor = Arc::new(Monitor::from_config(cfg, sites.clone())?);
    let result = scan_blocking(&monitor, sites, days).await?;
    print_scan(&result, issues);
    Ok(())
}

/// Print items grouped by site, then totals per status.
pub(crate) fn print_scan(result: &ScanResult, issues_only: bool) {
    for (name, scan) in &result.sites {
        println!("{} ({})", name, scan.listing);
        for item in &scan.items {
            if issues_only && !item.status.is_gap() {
                continue;
            }
            println!(
                "  {:<16} {:<36} {:<16} {:>10} {:>10}",
                item.date_label,
                item.filename,
                item.status.label(),
                format_size(item.local_size),
                format_size(item.remote_size),
            );
        }
    }
    let counts = result.counts();
    let count_where = |pred: fn(FileStatus) -> bool| -> usize {
        counts.iter().filter(|(s, _)| pred(**s)).map(|(_, n)| n).sum()
    };
    let totals: Vec<String> = counts
        .iter()
        .map(|(status, n)| format!("{} {}", n, status))
        .collect();
    let totals = if totals.is_empty() {
        "nothing expected".to_string()
    } else {
        totals.join(", ")
    };
    println!(
        "{} site(s): {} ({} gap(s), {} fetchable)",
        result.sites.len(),
        totals,
        count_where(FileStatus::is_gap),
        count_where(FileStatus::is_fetchable),
    );
}
