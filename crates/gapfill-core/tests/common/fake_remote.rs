//! In-memory remote directory implementing `Connector`.
//!
//! Holds a flat name → bytes map. Can be switched to "unreachable" (listing and
//! downloads fail with a transient connection error) or told to fail downloads only.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gapfill_core::connector::{Connector, ConnectorError, RemoteListing};
use gapfill_core::site::SiteConfig;

#[derive(Debug, Default)]
pub struct FakeRemote {
    files: Mutex<HashMap<String, Vec<u8>>>,
    unreachable: AtomicBool,
    fail_downloads: AtomicBool,
    list_calls: AtomicUsize,
    download_calls: AtomicUsize,
}

impl FakeRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Publish a file of `size` bytes.
    pub fn put(&self, name: &str, size: usize) {
        let body: Vec<u8> = (0u8..=250).cycle().take(size).collect();
        self.files.lock().unwrap().insert(name.to_string(), body);
    }

    pub fn remove(&self, name: &str) {
        self.files.lock().unwrap().remove(name);
    }

    pub fn set_unreachable(&self, on: bool) {
        self.unreachable.store(on, Ordering::SeqCst);
    }

    pub fn set_fail_downloads(&self, on: bool) {
        self.fail_downloads.store(on, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }
}

impl Connector for FakeRemote {
    fn list_and_size(&self, site: &SiteConfig) -> Result<RemoteListing, ConnectorError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(ConnectorError::Connection(format!("{}: connection refused", site.host)));
        }
        let files = self.files.lock().unwrap();
        Ok(files
            .iter()
            .map(|(name, body)| (name.clone(), body.len() as u64))
            .collect())
    }

    fn download(&self, site: &SiteConfig, filename: &str, dest: &Path) -> Result<u64, ConnectorError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) || self.fail_downloads.load(Ordering::SeqCst) {
            return Err(ConnectorError::Connection(format!("{}: reset by peer", site.host)));
        }
        let body = self
            .files
            .lock()
            .unwrap()
            .get(filename)
            .cloned()
            .ok_or_else(|| ConnectorError::NotFound(filename.to_string()))?;
        std::fs::write(dest, &body).map_err(ConnectorError::Storage)?;
        Ok(body.len() as u64)
    }
}
