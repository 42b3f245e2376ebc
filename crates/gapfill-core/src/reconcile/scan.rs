//! Scan one site: expected × remote × local → classified items.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::status::{FileStatus, StatusInputs};
use crate::connector::{Connector, RemoteListing};
use crate::pattern::{self, ExpectedFileEntry, PatternError};
use crate::retry::{classify, run_with_retry, ErrorKind, RetryPolicy};
use crate::site::{Frequency, SiteConfig};

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("create output dir {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How the remote listing for a site ended.
///
/// Classification treats `Empty` and `Failed` alike (every file is "missing
/// remotely"); this record keeps the difference visible in logs and output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingState {
    Listed(usize),
    Empty,
    Failed(String),
}

impl fmt::Display for ListingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingState::Listed(n) => write!(f, "{} remote file(s)", n),
            ListingState::Empty => write!(f, "remote directory empty"),
            ListingState::Failed(cause) => write!(f, "listing failed: {}", cause),
        }
    }
}

/// One expected file with its remote/local state and status.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledItem {
    pub site: Arc<SiteConfig>,
    pub timestamp: DateTime<Utc>,
    pub filename: String,
    pub date_label: String,
    pub local_exists: bool,
    pub local_size: u64,
    pub remote_exists: bool,
    pub remote_size: u64,
    pub size_match: bool,
    pub status: FileStatus,
    pub future: bool,
    /// Slot of the current UTC hour (hourly sites); the remote may still be appending.
    pub current: bool,
    pub local_path: PathBuf,
}

impl ReconciledItem {
    /// Ready to download: fixable status and not the growing current-hour file.
    pub fn is_ready(&self) -> bool {
        self.status.is_fetchable() && !self.current
    }

    /// Record a verified download of `size` bytes.
    pub fn mark_downloaded(&mut self, size: u64) {
        self.local_exists = true;
        self.local_size = size;
        self.size_match = true;
        self.status = FileStatus::Ok;
    }
}

/// Result of scanning one site.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteScan {
    pub listing: ListingState,
    pub items: Vec<ReconciledItem>,
}

/// Ask the site for its listing through the retry policy and fold the outcome.
/// Whatever happens, the caller gets a listing to classify against.
pub fn fetch_listing(
    connector: &dyn Connector,
    policy: &RetryPolicy,
    site: &SiteConfig,
) -> (RemoteListing, ListingState) {
    match run_with_retry(policy, || connector.list_and_size(site)) {
        Ok(listing) if listing.is_empty() => (listing, ListingState::Empty),
        Ok(listing) => {
            let n = listing.len();
            (listing, ListingState::Listed(n))
        }
        Err(e) if classify(&e) == ErrorKind::NoMatchingFiles => {
            tracing::info!(site = %site.name, "no files on remote");
            (RemoteListing::default(), ListingState::Empty)
        }
        Err(e) => {
            tracing::warn!(site = %site.name, host = %site.host, "listing failed: {}", e);
            (RemoteListing::default(), ListingState::Failed(e.to_string()))
        }
    }
}

fn local_state(path: &std::path::Path) -> (bool, u64) {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => (true, meta.len()),
        _ => (false, 0),
    }
}

/// Classify one expected entry against the listing and the local directory.
pub fn reconcile_entry(
    site: &Arc<SiteConfig>,
    entry: ExpectedFileEntry,
    listing: &RemoteListing,
    now: DateTime<Utc>,
) -> ReconciledItem {
    let local_path = site.output_dir.join(&entry.filename);
    let (local_exists, local_size) = local_state(&local_path);
    let remote_exists = listing.contains(&entry.filename);
    let remote_size = listing.size_of(&entry.filename);
    let size_match = local_exists && remote_exists && local_size == remote_size;
    let future = entry.timestamp > now;
    let current =
        site.frequency == Frequency::Hourly && entry.timestamp == pattern::hour_start(now);

    let status = FileStatus::classify(StatusInputs {
        future,
        current,
        remote_exists,
        local_exists,
        size_match,
    });

    ReconciledItem {
        site: Arc::clone(site),
        timestamp: entry.timestamp,
        filename: entry.filename,
        date_label: entry.date_label,
        local_exists,
        local_size,
        remote_exists,
        remote_size,
        size_match,
        status,
        future,
        current,
        local_path,
    }
}

/// Scan one site over the last `days_back` UTC days.
///
/// A site that cannot be listed still yields items: every non-future entry is
/// classified "missing remotely", the same as a site that published nothing.
pub fn scan_site(
    connector: &dyn Connector,
    policy: &RetryPolicy,
    site: &Arc<SiteConfig>,
    days_back: u32,
    now: DateTime<Utc>,
) -> Result<SiteScan, ScanError> {
    let expected = pattern::generate(site, days_back, now)?;
    let (listing, state) = fetch_listing(connector, policy, site);

    std::fs::create_dir_all(&site.output_dir).map_err(|source| ScanError::OutputDir {
        path: site.output_dir.clone(),
        source,
    })?;

    let items: Vec<ReconciledItem> = expected
        .into_iter()
        .map(|entry| reconcile_entry(site, entry, &listing, now))
        .collect();

    tracing::debug!(site = %site.name, expected = items.len(), listing = %state, "site scanned");
    Ok(SiteScan {
        listing: state,
        items,
    })
}
