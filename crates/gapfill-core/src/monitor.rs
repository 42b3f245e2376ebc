//! The monitor ties sites, connectors, retry policy and the published scan together.
//!
//! A *cycle* is one full scan of every site, optionally followed by the
//! automatic download pass, ending with the new result being published. Cycles
//! are serialized by a [`CycleGuard`]; callers from any thread may trigger one.

use chrono::{DateTime, Utc};
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::GapfillConfig;
use crate::connector::{ConnectorError, Connectors};
use crate::control::CycleGuard;
use crate::orchestrator::{self, DownloadReport};
use crate::progress::{report, ProgressFn};
use crate::reconcile::{self, ScanResult, ScanStore};
use crate::retry::RetryPolicy;
use crate::site::SiteConfig;

/// Scan window and grace window used by cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub days_back: u32,
    pub grace_minutes: u32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            days_back: 1,
            grace_minutes: 15,
        }
    }
}

impl From<&GapfillConfig> for MonitorSettings {
    fn from(cfg: &GapfillConfig) -> Self {
        Self {
            days_back: cfg.days_back,
            grace_minutes: cfg.grace_minutes,
        }
    }
}

/// What a cycle trigger did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed {
        sites: usize,
        items: usize,
        downloads: Option<DownloadReport>,
    },
    /// Another cycle was already running; this trigger was dropped.
    Skipped,
}

pub struct Monitor {
    sites: RwLock<Vec<Arc<SiteConfig>>>,
    connectors: Connectors,
    policy: RetryPolicy,
    settings: MonitorSettings,
    store: ScanStore,
    guard: CycleGuard,
}

impl Monitor {
    pub fn new(
        sites: Vec<Arc<SiteConfig>>,
        connectors: Connectors,
        policy: RetryPolicy,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            sites: RwLock::new(sites),
            connectors,
            policy,
            settings,
            store: ScanStore::new(),
            guard: CycleGuard::new(),
        }
    }

    /// Monitor wired with the curl connectors and the config's policy and windows.
    /// Fails if the linked libcurl cannot reach some site's protocol.
    pub fn from_config(cfg: &GapfillConfig, sites: Vec<Arc<SiteConfig>>) -> Result<Self, ConnectorError> {
        let connectors = Connectors::curl_for(cfg.timeouts, &sites)?;
        Ok(Self::new(
            sites,
            connectors,
            cfg.retry_policy(),
            MonitorSettings::from(cfg),
        ))
    }

    pub fn settings(&self) -> MonitorSettings {
        self.settings
    }

    pub fn guard(&self) -> &CycleGuard {
        &self.guard
    }

    /// Snapshot of the site list; scans work on this copy.
    pub fn sites(&self) -> Vec<Arc<SiteConfig>> {
        self.sites.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replace the site list (after a registry edit). Takes effect from the next scan.
    pub fn set_sites(&self, sites: Vec<Arc<SiteConfig>>) {
        *self.sites.write().unwrap_or_else(PoisonError::into_inner) = sites;
    }

    /// Most recently published scan.
    pub fn latest(&self) -> Option<Arc<ScanResult>> {
        self.store.latest()
    }

    /// Scan the given sites. A site whose template is broken or whose output
    /// directory cannot be created is logged and left out.
    pub fn scan_sites(
        &self,
        sites: &[Arc<SiteConfig>],
        days_back: u32,
        now: DateTime<Utc>,
        progress: Option<ProgressFn<'_>>,
    ) -> ScanResult {
        let mut result = ScanResult::new(now);
        for site in sites {
            report(
                progress,
                &format!("Scanning {} [{} {}]...", site.name, site.network, site.sample_rate),
            );
            let connector = self.connectors.for_site(site);
            match reconcile::scan_site(connector, &self.policy, site, days_back, now) {
                Ok(scan) => result.insert(&site.name, scan),
                Err(e) => {
                    tracing::warn!(site = %site.name, "scan skipped: {}", e);
                    report(progress, &format!("Skipped {}: {}", site.name, e));
                }
            }
        }
        report(progress, "Scan complete");
        result
    }

    /// Scan every configured site.
    pub fn scan_all(
        &self,
        days_back: u32,
        now: DateTime<Utc>,
        progress: Option<ProgressFn<'_>>,
    ) -> ScanResult {
        self.scan_sites(&self.sites(), days_back, now, progress)
    }

    /// Download every ready item of `result`.
    pub fn download_missing(
        &self,
        result: &mut ScanResult,
        progress: Option<ProgressFn<'_>>,
    ) -> DownloadReport {
        orchestrator::download_missing(&self.connectors, &self.policy, result.items_mut(), progress)
    }

    /// Download every ready item older than the grace window.
    pub fn auto_download_completed(
        &self,
        result: &mut ScanResult,
        delay_minutes: u32,
        now: DateTime<Utc>,
        progress: Option<ProgressFn<'_>>,
    ) -> DownloadReport {
        orchestrator::auto_download_completed(
            &self.connectors,
            &self.policy,
            result,
            delay_minutes,
            now,
            progress,
        )
    }

    /// Publish `result` as the live scan.
    pub fn publish(&self, result: ScanResult) -> Arc<ScanResult> {
        self.store.publish(result)
    }

    /// One full cycle at the current time.
    pub fn run_cycle(&self, auto_download: bool, progress: Option<ProgressFn<'_>>) -> CycleOutcome {
        self.run_cycle_at(auto_download, Utc::now(), progress)
    }

    /// Scan everything as of `now`, optionally run the automatic download pass, publish.
    pub fn run_cycle_at(
        &self,
        auto_download: bool,
        now: DateTime<Utc>,
        progress: Option<ProgressFn<'_>>,
    ) -> CycleOutcome {
        let Some(_token) = self.guard.try_begin() else {
            tracing::info!("cycle already in progress; trigger skipped");
            return CycleOutcome::Skipped;
        };

        let mut result = self.scan_all(self.settings.days_back, now, progress);
        let downloads = auto_download.then(|| {
            self.auto_download_completed(&mut result, self.settings.grace_minutes, now, progress)
        });
        let sites = result.sites.len();
        let items = result.items().count();
        self.publish(result);
        tracing::info!(sites, items, "cycle finished");
        CycleOutcome::Completed {
            sites,
            items,
            downloads,
        }
    }

    /// Download every ready item of the published scan and publish the updated copy.
    /// `None` when nothing has been scanned yet.
    pub fn download_latest(&self, progress: Option<ProgressFn<'_>>) -> Option<CycleOutcome> {
        let Some(_token) = self.guard.try_begin() else {
            tracing::info!("cycle already in progress; download skipped");
            return Some(CycleOutcome::Skipped);
        };
        // Read under the guard so a cycle cannot publish in between.
        let latest = self.latest()?;
        let mut result = ScanResult::clone(&latest);
        let downloads = self.download_missing(&mut result, progress);
        let sites = result.sites.len();
        let items = result.items().count();
        self.publish(result);
        Some(CycleOutcome::Completed {
            sites,
            items,
            downloads: Some(downloads),
        })
    }
}
