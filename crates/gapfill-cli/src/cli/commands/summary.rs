//! `gapfill summary` – per-station roll-up of a fresh scan.

use anyhow::Result;
use chrono::Utc;
use gapfill_core::config::GapfillConfig;
use gapfill_core::monitor::Monitor;
use gapfill_core::summary::summarize;
use std::sync::Arc;

use super::{open_registry, scan_blocking, select_sites};

pub async fn run_summary(
    cfg: &GapfillConfig,
    days: u32,
    window_days: u32,
    site: Option<&str>,
) -> Result<()> {
    let registry = open_registry(cfg)?;
    let sites = select_sites(&registry, site)?;
    let monitor = Arc::new(Monitor::from_config(cfg, sites.clone())?);
    let result = scan_blocking(&monitor, sites, days).await?;

    let rows = summarize(&result, window_days, Utc::now(), site);
    if rows.is_empty() {
        println!("Nothing scanned.");
        return Ok(());
    }

    println!("{:<56} {:<20} {:<36} {}", "GROUP", "LAST", "LAST FILE", "MISSING");
    for row in &rows {
        let last = row
            .last_seen
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "Never".to_string());
        println!(
            "{:<56} {:<20} {:<36} {}",
            row.key.to_string(),
            last,
            row.last_file.as_deref().unwrap_or("—"),
            row.missing.len()
        );
        if row.is_complete() {
            continue;
        }
        for file in &row.missing {
            println!("    {}", file);
        }
    }

    let total_missing: usize = rows.iter().map(|r| r.missing.len()).sum();
    let filter = site.map(|s| format!(" (filtered: {})", s)).unwrap_or_default();
    println!(
        "Summary: {} station(s) | {} missing file(s){}",
        rows.len(),
        total_missing,
        filter
    );
    Ok(())
}
