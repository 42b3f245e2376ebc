//! Persist the site list to disk as pretty JSON. Every change rewrites the whole file.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{SiteConfig, SiteRecord};

/// In-memory site list bound to its JSON file.
#[derive(Debug)]
pub struct SiteRegistry {
    path: PathBuf,
    output_root: PathBuf,
    sites: Vec<Arc<SiteConfig>>,
}

impl SiteRegistry {
    /// Load the site list from `path`. A missing file yields an empty registry;
    /// an unreadable or invalid file is an error.
    pub fn load(path: &Path, output_root: &Path) -> Result<Self> {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no site list yet");
                return Ok(Self {
                    path: path.to_path_buf(),
                    output_root: output_root.to_path_buf(),
                    sites: Vec::new(),
                });
            }
            Err(e) => return Err(e).with_context(|| format!("read site list: {}", path.display())),
        };
        let records: Vec<SiteRecord> = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse site list: {}", path.display()))?;

        let mut sites: Vec<Arc<SiteConfig>> = Vec::with_capacity(records.len());
        for record in records {
            let site = SiteConfig::from_record(record, output_root)
                .with_context(|| format!("invalid site in {}", path.display()))?;
            if sites.iter().any(|s| s.name == site.name) {
                anyhow::bail!("duplicate site name {:?} in {}", site.name, path.display());
            }
            sites.push(Arc::new(site));
        }
        tracing::debug!(count = sites.len(), path = %path.display(), "loaded sites");
        Ok(Self {
            path: path.to_path_buf(),
            output_root: output_root.to_path_buf(),
            sites,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sites(&self) -> &[Arc<SiteConfig>] {
        &self.sites
    }

    pub fn get(&self, name: &str) -> Option<&Arc<SiteConfig>> {
        self.sites.iter().find(|s| s.name == name)
    }

    /// Add a site and persist. Names must be unique.
    pub fn add(&mut self, record: SiteRecord) -> Result<Arc<SiteConfig>> {
        let site = SiteConfig::from_record(record, &self.output_root)?;
        if self.get(&site.name).is_some() {
            anyhow::bail!("site {:?} already exists", site.name);
        }
        let site = Arc::new(site);
        let mut candidate = self.sites.clone();
        candidate.push(Arc::clone(&site));
        self.commit(candidate)?;
        tracing::info!(site = %site.name, "site added");
        Ok(site)
    }

    /// Replace the site called `name` with `record` (which may rename it) and persist.
    pub fn edit(&mut self, name: &str, record: SiteRecord) -> Result<Arc<SiteConfig>> {
        let index = self.index_of(name)?;
        let site = SiteConfig::from_record(record, &self.output_root)?;
        if site.name != name && self.get(&site.name).is_some() {
            anyhow::bail!("cannot rename {:?}: site {:?} already exists", name, site.name);
        }
        let site = Arc::new(site);
        let mut candidate = self.sites.clone();
        candidate[index] = Arc::clone(&site);
        self.commit(candidate)?;
        tracing::info!(site = %site.name, "site updated");
        Ok(site)
    }

    /// Remove the site called `name` and persist.
    pub fn delete(&mut self, name: &str) -> Result<Arc<SiteConfig>> {
        let index = self.index_of(name)?;
        let mut candidate = self.sites.clone();
        let removed = candidate.remove(index);
        self.commit(candidate)?;
        tracing::info!(site = %removed.name, "site removed");
        Ok(removed)
    }

    /// Persist `sites`, then make them the in-memory list. On a write error
    /// the registry keeps its previous list.
    fn commit(&mut self, sites: Vec<Arc<SiteConfig>>) -> Result<()> {
        write_list(&self.path, &sites)?;
        self.sites = sites;
        Ok(())
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.sites
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| anyhow::anyhow!("no site named {:?}", name))
    }
}

/// Write the full list to disk (creates parent dir if needed).
fn write_list(path: &Path, sites: &[Arc<SiteConfig>]) -> Result<()> {
    let records: Vec<SiteRecord> = sites.iter().map(|s| s.to_record()).collect();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(&records).context("serialize site list")?;
    std::fs::write(path, json).with_context(|| format!("write site list: {}", path.display()))?;
    Ok(())
}
