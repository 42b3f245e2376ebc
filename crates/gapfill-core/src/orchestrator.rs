//! Download orchestration: fetch the gaps a scan found, one file at a time.
//!
//! Only items whose status a download can fix (missing locally, size mismatch)
//! and that are not the growing current-hour file are attempted. A failure is
//! logged and counted; it never stops the remaining downloads.

use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;

use crate::connector::{ConnectorError, Connectors};
use crate::progress::{report, ProgressFn};
use crate::reconcile::{ReconciledItem, ScanResult};
use crate::retry::{run_with_retry, RetryPolicy};

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error(transparent)]
    Transfer(#[from] ConnectorError),
    /// The connector reported success but the file is not there afterwards.
    #[error("{} missing after download: {source}", .path.display())]
    Verification {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome counters for one orchestration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Fetch one item and check the file landed. Returns its on-disk size.
fn download_one(
    connectors: &Connectors,
    policy: &RetryPolicy,
    item: &ReconciledItem,
) -> Result<u64, DownloadError> {
    let connector = connectors.for_site(&item.site);
    let bytes = run_with_retry(policy, || {
        connector.download(&item.site, &item.filename, &item.local_path)
    })?;
    let meta = std::fs::metadata(&item.local_path).map_err(|source| DownloadError::Verification {
        path: item.local_path.clone(),
        source,
    })?;
    if !meta.is_file() {
        return Err(DownloadError::Verification {
            path: item.local_path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "not a regular file"),
        });
    }
    if meta.len() != bytes {
        tracing::debug!(file = %item.filename, reported = bytes, on_disk = meta.len(), "size differs from transfer count");
    }
    Ok(meta.len())
}

/// Download every ready item in order and update the ones that succeed.
pub fn download_missing<'a, I>(
    connectors: &Connectors,
    policy: &RetryPolicy,
    items: I,
    progress: Option<ProgressFn<'_>>,
) -> DownloadReport
where
    I: IntoIterator<Item = &'a mut ReconciledItem>,
{
    let ready: Vec<&mut ReconciledItem> = items.into_iter().filter(|i| i.is_ready()).collect();
    let total = ready.len();
    let mut report_counts = DownloadReport::default();

    for (n, item) in ready.into_iter().enumerate() {
        report(progress, &format!("Downloading {} ({}/{})", item.filename, n + 1, total));
        report_counts.attempted += 1;
        match download_one(connectors, policy, item) {
            Ok(size) => {
                item.mark_downloaded(size);
                report_counts.succeeded += 1;
                tracing::info!(site = %item.site.name, file = %item.filename, bytes = size, "downloaded");
            }
            Err(e) => {
                report_counts.failed += 1;
                tracing::warn!(site = %item.site.name, file = %item.filename, "download failed: {}", e);
                report(progress, &format!("Failed {}: {}", item.filename, e));
            }
        }
    }
    report_counts
}

/// Like [`download_missing`] over a whole scan, but skips any slot younger than
/// `delay_minutes`: the station may still be finalizing it.
pub fn auto_download_completed(
    connectors: &Connectors,
    policy: &RetryPolicy,
    result: &mut ScanResult,
    delay_minutes: u32,
    now: DateTime<Utc>,
    progress: Option<ProgressFn<'_>>,
) -> DownloadReport {
    let cutoff = now - Duration::minutes(i64::from(delay_minutes));
    let eligible = result.items_mut().filter(|i| i.timestamp < cutoff);
    let totals = download_missing(connectors, policy, eligible, progress);
    if totals.attempted > 0 {
        tracing::info!(
            attempted = totals.attempted,
            succeeded = totals.succeeded,
            failed = totals.failed,
            "automatic download pass finished"
        );
    }
    totals
}
