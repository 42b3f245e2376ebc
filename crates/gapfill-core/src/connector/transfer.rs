//! Shared libcurl plumbing: URL construction, handle setup, text fetch, file download.

use curl::easy::Easy;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use url::Url;

use super::ConnectorError;
use crate::config::TimeoutConfig;
use crate::site::{Protocol, SiteConfig};

/// URL of the site's remote directory, with a trailing slash.
///
/// Absolute FTP paths get a leading `%2F` segment so curl does not resolve them
/// relative to the login directory; relative SFTP paths are anchored at `~`.
pub fn remote_dir_url(site: &SiteConfig) -> Result<Url, ConnectorError> {
    let base = format!("{}://{}:{}/", site.protocol.scheme(), site.host, site.port);
    let mut url = Url::parse(&base).map_err(|e| ConnectorError::InvalidUrl(format!("{}: {}", base, e)))?;
    let absolute = site.remote_path.starts_with('/');
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| ConnectorError::InvalidUrl(base.clone()))?;
        segments.pop_if_empty();
        match (site.protocol, absolute) {
            (Protocol::Ftp, true) => {
                segments.push("/");
            }
            (Protocol::Sftp, false) => {
                segments.push("~");
            }
            _ => {}
        }
        segments.extend(site.remote_path.split('/').filter(|s| !s.is_empty()));
        segments.push("");
    }
    Ok(url)
}

/// URL of one file inside the site's remote directory.
pub(super) fn remote_file_url(site: &SiteConfig, filename: &str) -> Result<Url, ConnectorError> {
    let mut url = remote_dir_url(site)?;
    url.path_segments_mut()
        .map_err(|_| ConnectorError::InvalidUrl(site.host.clone()))?
        .pop_if_empty()
        .push(filename);
    Ok(url)
}

/// A curl handle for `url` with credentials and both timeouts applied.
/// The read timeout is a stall limit: less than 1 byte/s for `read_secs` aborts the transfer.
pub(super) fn open_handle(
    site: &SiteConfig,
    url: &Url,
    timeouts: TimeoutConfig,
) -> Result<Easy, ConnectorError> {
    let mut easy = Easy::new();
    easy.url(url.as_str())?;
    if !site.user.is_empty() {
        easy.username(&site.user)?;
        easy.password(&site.password)?;
    }
    easy.connect_timeout(timeouts.connect())?;
    easy.low_speed_limit(1)?;
    easy.low_speed_time(timeouts.read())?;
    Ok(easy)
}

/// Perform the request and return the body as text (listings).
pub(super) fn fetch_text(easy: &mut Easy) -> Result<String, ConnectorError> {
    let mut body: Vec<u8> = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Size of the file the handle points at, via a body-less request (FTP `SIZE`).
/// `None` when the server does not report one.
pub(super) fn probe_size(easy: &mut Easy, url: &Url) -> Result<Option<u64>, ConnectorError> {
    easy.url(url.as_str())?;
    easy.nobody(true)?;
    easy.perform()?;
    let len = easy.content_length_download()?;
    Ok((len >= 0.0).then_some(len as u64))
}

/// Perform the request, writing the body to `dest`. Returns bytes written.
pub(super) fn download_to_file(easy: &mut Easy, dest: &Path) -> Result<u64, ConnectorError> {
    let mut file = File::create(dest).map_err(ConnectorError::Storage)?;
    let mut written = 0u64;
    let mut write_err: Option<std::io::Error> = None;
    let result = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match file.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                tracing::warn!("download write to {} failed: {}", dest.display(), e);
                write_err = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };
    if let Some(e) = write_err {
        return Err(ConnectorError::Storage(e));
    }
    result?;
    file.flush().map_err(ConnectorError::Storage)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SiteRecord;

    fn site(protocol: &str, path: &str) -> SiteConfig {
        let mut rec = SiteRecord::new("S", "gnss.example.org", protocol);
        rec.path = path.to_string();
        SiteConfig::from_record(rec, Path::new("/tmp")).unwrap()
    }

    #[test]
    fn ftp_absolute_path_is_anchored_at_root() {
        let url = remote_dir_url(&site("ftp", "/pub/AUT1")).unwrap();
        assert_eq!(url.as_str(), "ftp://gnss.example.org/%2F/pub/AUT1/");
    }

    #[test]
    fn ftp_relative_path_stays_relative() {
        let url = remote_dir_url(&site("ftp", "data/hourly/")).unwrap();
        assert_eq!(url.as_str(), "ftp://gnss.example.org/data/hourly/");
    }

    #[test]
    fn sftp_keeps_port_and_anchors_relative_paths_at_home() {
        let url = remote_dir_url(&site("sftp", "incoming")).unwrap();
        assert_eq!(url.as_str(), "sftp://gnss.example.org:22/~/incoming/");
        let url = remote_dir_url(&site("sftp", "/srv/gnss")).unwrap();
        assert_eq!(url.as_str(), "sftp://gnss.example.org:22/srv/gnss/");
    }

    #[test]
    fn file_url_appends_encoded_name() {
        let url = remote_file_url(&site("ftp", "/pub"), "AUT1 0010.dat").unwrap();
        assert_eq!(url.as_str(), "ftp://gnss.example.org/%2F/pub/AUT1%200010.dat");
    }

    #[test]
    fn empty_path_is_login_directory() {
        let url = remote_dir_url(&site("ftp", "")).unwrap();
        assert_eq!(url.as_str(), "ftp://gnss.example.org/");
    }
}
