//! Remote site access: list a directory with sizes, fetch one file.
//!
//! Both transports go through libcurl (the `curl` crate); this crate never
//! speaks FTP or SFTP framing itself. Every call applies a connect timeout and
//! a separate read (stall) timeout and returns a typed [`ConnectorError`] so
//! the retry layer, not the connector, decides whether to try again.

mod error;
mod ftp;
mod listing;
mod sftp;
mod transfer;

pub use error::ConnectorError;
pub use ftp::FtpConnector;
pub use listing::{parse_long_listing, parse_mlsd, parse_name_list};
pub use sftp::SftpConnector;
pub use transfer::remote_dir_url;

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use crate::config::TimeoutConfig;
use crate::site::{Protocol, SiteConfig};

/// Files found in a site's remote directory, with their sizes in bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteListing {
    pub files: BTreeSet<String>,
    pub sizes: HashMap<String, u64>,
}

impl RemoteListing {
    pub fn insert(&mut self, name: impl Into<String>, size: u64) {
        let name = name.into();
        self.sizes.insert(name.clone(), size);
        self.files.insert(name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains(name)
    }

    /// Size reported for `name`; 0 when the file is absent or its size is unknown.
    pub fn size_of(&self, name: &str) -> u64 {
        self.sizes.get(name).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

impl FromIterator<(String, u64)> for RemoteListing {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut listing = RemoteListing::default();
        for (name, size) in iter {
            listing.insert(name, size);
        }
        listing
    }
}

/// Transport capability for one protocol. Calls block the current thread.
pub trait Connector: Send + Sync {
    /// List the site's remote directory (non-recursive) with file sizes.
    fn list_and_size(&self, site: &SiteConfig) -> Result<RemoteListing, ConnectorError>;

    /// Fetch `filename` from the site's remote directory into `dest`, returning bytes written.
    /// Not atomic: a failed transfer may leave a partial file at `dest`.
    fn download(&self, site: &SiteConfig, filename: &str, dest: &Path) -> Result<u64, ConnectorError>;
}

/// One connector per protocol; picks the right one for a site.
#[derive(Clone)]
pub struct Connectors {
    ftp: Arc<dyn Connector>,
    sftp: Arc<dyn Connector>,
}

impl Connectors {
    pub fn new(ftp: Arc<dyn Connector>, sftp: Arc<dyn Connector>) -> Self {
        Self { ftp, sftp }
    }

    /// The libcurl-backed connectors.
    pub fn curl(timeouts: TimeoutConfig) -> Self {
        Self::new(
            Arc::new(FtpConnector::new(timeouts)),
            Arc::new(SftpConnector::new(timeouts)),
        )
    }

    /// The libcurl-backed connectors, after checking that the linked libcurl
    /// speaks every protocol `sites` use.
    pub fn curl_for(timeouts: TimeoutConfig, sites: &[Arc<SiteConfig>]) -> Result<Self, ConnectorError> {
        ensure_supported(sites.iter().map(|s| s.protocol))?;
        Ok(Self::curl(timeouts))
    }

    pub fn for_protocol(&self, protocol: Protocol) -> &dyn Connector {
        match protocol {
            Protocol::Ftp => self.ftp.as_ref(),
            Protocol::Sftp => self.sftp.as_ref(),
        }
    }

    pub fn for_site(&self, site: &SiteConfig) -> &dyn Connector {
        self.for_protocol(site.protocol)
    }
}

/// Error unless the linked libcurl lists every protocol in `protocols`.
///
/// A libcurl without FTP (curl-sys' bundled build) or without SFTP (no libssh2)
/// fails every call with "unsupported protocol", which would otherwise read as
/// every file missing remotely.
pub fn ensure_supported(protocols: impl IntoIterator<Item = Protocol>) -> Result<(), ConnectorError> {
    let version = curl::Version::get();
    for protocol in protocols {
        if !speaks(version.protocols(), protocol) {
            return Err(ConnectorError::Unsupported {
                protocol: protocol.scheme(),
                version: version.version().to_string(),
            });
        }
    }
    Ok(())
}

fn speaks<'a>(mut available: impl Iterator<Item = &'a str>, protocol: Protocol) -> bool {
    available.any(|p| p.eq_ignore_ascii_case(protocol.scheme()))
}
