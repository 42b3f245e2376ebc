//! FTP connector.
//!
//! Listing prefers `MLSD` (names, types and sizes in one round trip). Servers
//! that reject it get `NLST` followed by one `SIZE` query per file; sizes the
//! server will not report are recorded as 0.

use std::path::Path;

use super::listing::{parse_mlsd, parse_name_list};
use super::transfer::{download_to_file, fetch_text, open_handle, probe_size, remote_dir_url, remote_file_url};
use super::{Connector, ConnectorError, RemoteListing};
use crate::config::TimeoutConfig;
use crate::retry::{classify, ErrorKind};
use crate::site::SiteConfig;

#[derive(Debug, Clone, Copy, Default)]
pub struct FtpConnector {
    timeouts: TimeoutConfig,
}

impl FtpConnector {
    pub fn new(timeouts: TimeoutConfig) -> Self {
        Self { timeouts }
    }

    /// `Ok(None)` when the server does not support MLSD (or answers with something else).
    fn list_mlsd(&self, site: &SiteConfig) -> Result<Option<RemoteListing>, ConnectorError> {
        let url = remote_dir_url(site)?;
        let mut easy = open_handle(site, &url, self.timeouts)?;
        easy.custom_request("MLSD")?;
        match fetch_text(&mut easy) {
            Ok(body) if body.trim().is_empty() => Ok(Some(RemoteListing::default())),
            Ok(body) => Ok(parse_mlsd(&body)),
            // Transport and login failures are real; anything else means "MLSD not understood".
            Err(e) if classify(&e) == ErrorKind::Other => {
                tracing::debug!(site = %site.name, "MLSD unsupported, falling back to NLST: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn list_nlst(&self, site: &SiteConfig) -> Result<RemoteListing, ConnectorError> {
        let url = remote_dir_url(site)?;
        let mut easy = open_handle(site, &url, self.timeouts)?;
        easy.custom_request("NLST")?;
        let body = match fetch_text(&mut easy) {
            Ok(body) => body,
            Err(ConnectorError::Curl(e)) if is_no_files_answer(&e) => {
                return Err(ConnectorError::NoMatchingFiles);
            }
            Err(e) => return Err(e),
        };
        let names = parse_name_list(&body);
        if names.is_empty() {
            return Ok(RemoteListing::default());
        }

        // One handle for every SIZE query so libcurl reuses the control connection.
        let mut sizer = open_handle(site, &url, self.timeouts)?;
        let mut listing = RemoteListing::default();
        for name in names {
            let size = match remote_file_url(site, &name).and_then(|u| probe_size(&mut sizer, &u)) {
                Ok(size) => size.unwrap_or(0),
                Err(e) => {
                    tracing::debug!(site = %site.name, file = %name, "SIZE failed, assuming 0: {}", e);
                    0
                }
            };
            listing.insert(name, size);
        }
        Ok(listing)
    }
}

/// libcurl already treats a 450 on a listing as an empty success; a 550
/// ("No files found") on NLST surfaces as `CURLE_FTP_COULDNT_RETR_FILE`.
fn is_no_files_answer(e: &curl::Error) -> bool {
    e.code() == curl_sys::CURLE_FTP_COULDNT_RETR_FILE
}

impl Connector for FtpConnector {
    fn list_and_size(&self, site: &SiteConfig) -> Result<RemoteListing, ConnectorError> {
        if let Some(listing) = self.list_mlsd(site)? {
            return Ok(listing);
        }
        self.list_nlst(site)
    }

    fn download(&self, site: &SiteConfig, filename: &str, dest: &Path) -> Result<u64, ConnectorError> {
        let url = remote_file_url(site, filename)?;
        let mut easy = open_handle(site, &url, self.timeouts)?;
        download_to_file(&mut easy, dest)
    }
}
