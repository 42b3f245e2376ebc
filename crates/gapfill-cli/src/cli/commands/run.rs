//! `gapfill run` – hourly scan-and-download until Ctrl-C.

use anyhow::{Context, Result};
use gapfill_core::config::GapfillConfig;
use gapfill_core::connector::Connectors;
use gapfill_core::monitor::{Monitor, MonitorSettings};
use gapfill_core::scheduler::Scheduler;
use std::sync::Arc;

use super::open_registry;

pub async fn run_scheduler(
    cfg: &GapfillConfig,
    offset_minutes: Option<u32>,
    grace_minutes: Option<u32>,
) -> Result<()> {
    let registry = open_registry(cfg)?;
    if registry.sites().is_empty() {
        println!("No sites configured. Add one with `gapfill sites add`.");
        return Ok(());
    }

    let mut schedule = cfg.schedule;
    if let Some(m) = offset_minutes {
        schedule.offset_minutes = m;
    }
    let mut settings = MonitorSettings::from(cfg);
    if let Some(g) = grace_minutes {
        settings.grace_minutes = g;
    }

    let connectors = Connectors::curl_for(cfg.timeouts, registry.sites())?;
    let monitor = Monitor::new(registry.sites().to_vec(), connectors, cfg.retry_policy(), settings);
    let scheduler = Scheduler::new(Arc::new(monitor), schedule);

    let Some(handle) = scheduler.start() else {
        anyhow::bail!("scheduler already running");
    };
    println!(
        "Monitoring {} site(s); cycles at :{:02} past each hour, grace {} min. Ctrl-C to stop.",
        registry.sites().len(),
        schedule.offset_minutes.min(59),
        scheduler.monitor().settings().grace_minutes
    );
    if let Some(next) = scheduler.next_trigger() {
        println!("Next scheduled cycle: {}", next.format("%Y-%m-%d %H:%M UTC"));
    }

    tokio::signal::ctrl_c().await.context("wait for Ctrl-C")?;
    scheduler.stop();
    println!("Stopping; a cycle in progress runs to completion.");
    handle.await.context("tick loop join")?;
    if let Some(last) = scheduler.monitor().latest() {
        println!(
            "Last published scan: {} ({} site(s))",
            last.scanned_at.format("%Y-%m-%d %H:%M UTC"),
            last.sites.len()
        );
    }
    tracing::info!("scheduler exited");
    Ok(())
}
