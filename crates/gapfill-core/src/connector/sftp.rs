//! SFTP connector. libcurl returns directory URLs as a long (`ls -l`) listing,
//! which carries sizes, so no per-file queries are needed.

use std::path::Path;

use super::listing::parse_long_listing;
use super::transfer::{download_to_file, fetch_text, open_handle, remote_dir_url, remote_file_url};
use super::{Connector, ConnectorError, RemoteListing};
use crate::config::TimeoutConfig;
use crate::site::SiteConfig;

#[derive(Debug, Clone, Copy, Default)]
pub struct SftpConnector {
    timeouts: TimeoutConfig,
}

impl SftpConnector {
    pub fn new(timeouts: TimeoutConfig) -> Self {
        Self { timeouts }
    }
}

impl Connector for SftpConnector {
    fn list_and_size(&self, site: &SiteConfig) -> Result<RemoteListing, ConnectorError> {
        let url = remote_dir_url(site)?;
        let mut easy = open_handle(site, &url, self.timeouts)?;
        let body = fetch_text(&mut easy)?;
        Ok(parse_long_listing(&body))
    }

    fn download(&self, site: &SiteConfig, filename: &str, dest: &Path) -> Result<u64, ConnectorError> {
        let url = remote_file_url(site, filename)?;
        let mut easy = open_handle(site, &url, self.timeouts)?;
        download_to_file(&mut easy, dest)
    }
}
