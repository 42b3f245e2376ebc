//! The scan result and its single published copy.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::scan::{ReconciledItem, SiteScan};
use super::status::FileStatus;

/// Everything one scan found, keyed by site name.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub scanned_at: DateTime<Utc>,
    pub sites: BTreeMap<String, SiteScan>,
}

impl ScanResult {
    pub fn new(scanned_at: DateTime<Utc>) -> Self {
        Self {
            scanned_at,
            sites: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, site: &str, scan: SiteScan) {
        self.sites.insert(site.to_string(), scan);
    }

    pub fn items(&self) -> impl Iterator<Item = &ReconciledItem> {
        self.sites.values().flat_map(|s| s.items.iter())
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut ReconciledItem> {
        self.sites.values_mut().flat_map(|s| s.items.iter_mut())
    }

    /// Number of items per status across all sites.
    pub fn counts(&self) -> BTreeMap<FileStatus, usize> {
        let mut counts = BTreeMap::new();
        for item in self.items() {
            *counts.entry(item.status).or_insert(0) += 1;
        }
        counts
    }
}

/// Holds the most recent published `ScanResult`.
///
/// Publishing swaps the whole `Arc`; readers keep whatever snapshot they took and
/// never observe a half-updated result.
#[derive(Debug, Default)]
pub struct ScanStore {
    current: RwLock<Option<Arc<ScanResult>>>,
}

impl ScanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, result: ScanResult) -> Arc<ScanResult> {
        let result = Arc::new(result);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&result));
        result
    }

    pub fn latest(&self) -> Option<Arc<ScanResult>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
