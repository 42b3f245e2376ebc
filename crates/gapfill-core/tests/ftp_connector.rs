//! Integration tests: the libcurl FTP connector against a scripted local server.
//!
//! Covers MLSD listings, the NLST + SIZE fallback (unknown sizes read as 0),
//! "no files" answers on an empty directory, RETR into a file, a missing file,
//! and a local write failure aborting the transfer. Skipped when the linked
//! libcurl was built without FTP.

mod common;

use std::path::Path;
use std::sync::Arc;

use gapfill_core::config::TimeoutConfig;
use gapfill_core::connector::{Connector, ConnectorError, FtpConnector};
use gapfill_core::reconcile::{fetch_listing, ListingState};
use gapfill_core::retry::{classify, ErrorKind, RetryPolicy};
use gapfill_core::site::{SiteConfig, SiteRecord};
use tempfile::tempdir;

use common::ftp_server::{self, FtpServerOptions};

macro_rules! require_ftp {
    () => {
        if !ftp_server::ftp_enabled() {
            eprintln!("libcurl built without FTP; skipping");
            return;
        }
    };
}

fn local_site(root: &Path, port: u16) -> Arc<SiteConfig> {
    let mut rec = SiteRecord::new("LOCAL", "127.0.0.1", "ftp");
    rec.port = Some(port);
    rec.path = "/pub/data".to_string();
    rec.pattern = "LOCAL_%Y%m%d.dat".to_string();
    Arc::new(SiteConfig::from_record(rec, root).unwrap())
}

fn connector() -> FtpConnector {
    FtpConnector::new(TimeoutConfig {
        connect_secs: 5,
        read_secs: 5,
    })
}

fn body(len: usize) -> Vec<u8> {
    (0u8..=250).cycle().take(len).collect()
}

#[test]
fn mlsd_listing_carries_sizes() {
    require_ftp!();
    let root = tempdir().unwrap();
    let server = ftp_server::start(
        &[("LOCAL_20240101.dat", body(100)), ("LOCAL_20240102.dat", body(7))],
        FtpServerOptions {
            mlsd: true,
            ..Default::default()
        },
    );
    let site = local_site(root.path(), server.port);

    let listing = connector().list_and_size(&site).unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing.size_of("LOCAL_20240101.dat"), 100);
    assert_eq!(listing.size_of("LOCAL_20240102.dat"), 7);
    assert!(!server.received("NLST"));
    assert!(!server.received("SIZE"));
}

#[test]
fn nlst_fallback_queries_sizes_and_unknown_size_is_zero() {
    require_ftp!();
    let root = tempdir().unwrap();
    let server = ftp_server::start(
        &[("LOCAL_20240101.dat", body(100)), ("LOCAL_20240102.dat", body(7))],
        FtpServerOptions {
            mlsd: false,
            hide_size: vec!["LOCAL_20240102.dat".to_string()],
            ..Default::default()
        },
    );
    let site = local_site(root.path(), server.port);

    let listing = connector().list_and_size(&site).unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing.size_of("LOCAL_20240101.dat"), 100);
    assert!(listing.contains("LOCAL_20240102.dat"));
    assert_eq!(listing.size_of("LOCAL_20240102.dat"), 0);

    let commands = server.commands();
    let mlsd = commands.iter().position(|c| c == "MLSD").expect("MLSD tried first");
    let nlst = commands.iter().position(|c| c == "NLST").expect("NLST fallback");
    assert!(mlsd < nlst);
    assert!(commands.iter().filter(|c| *c == "SIZE").count() >= 2);
}

#[test]
fn nlst_no_files_answer_is_an_empty_listing() {
    require_ftp!();
    let root = tempdir().unwrap();
    let server = ftp_server::start(
        &[],
        FtpServerOptions {
            mlsd: false,
            nlst_550_when_empty: true,
            ..Default::default()
        },
    );
    let site = local_site(root.path(), server.port);

    let err = connector().list_and_size(&site).unwrap_err();
    assert!(matches!(err, ConnectorError::NoMatchingFiles), "got {:?}", err);

    let (listing, state) = fetch_listing(&connector(), &RetryPolicy::immediate(3), &site);
    assert!(listing.is_empty());
    assert_eq!(state, ListingState::Empty);
    // Not retried: one NLST per listing call.
    assert_eq!(server.commands().iter().filter(|c| *c == "NLST").count(), 2);
}

#[test]
fn download_writes_the_remote_bytes() {
    require_ftp!();
    let root = tempdir().unwrap();
    let data = body(4096);
    let server = ftp_server::start(&[("LOCAL_20240101.dat", data.clone())], FtpServerOptions::default());
    let site = local_site(root.path(), server.port);
    let dest = root.path().join("LOCAL_20240101.dat");

    let written = connector().download(&site, "LOCAL_20240101.dat", &dest).unwrap();
    assert_eq!(written, 4096);
    assert_eq!(std::fs::read(&dest).unwrap(), data);
    assert!(server.received("RETR"));
}

#[test]
fn missing_remote_file_is_permanent_not_found() {
    require_ftp!();
    let root = tempdir().unwrap();
    let server = ftp_server::start(&[], FtpServerOptions::default());
    let site = local_site(root.path(), server.port);

    let err = connector()
        .download(&site, "LOCAL_20240101.dat", &root.path().join("out.dat"))
        .unwrap_err();
    assert_eq!(classify(&err), ErrorKind::NotFound, "got {:?}", err);
    assert!(!classify(&err).is_transient());
}

#[cfg(target_os = "linux")]
#[test]
fn local_write_failure_aborts_the_transfer() {
    require_ftp!();
    let root = tempdir().unwrap();
    let server = ftp_server::start(&[("LOCAL_20240101.dat", body(1000))], FtpServerOptions::default());
    let site = local_site(root.path(), server.port);

    let err = connector()
        .download(&site, "LOCAL_20240101.dat", Path::new("/dev/full"))
        .unwrap_err();
    assert!(matches!(err, ConnectorError::Storage(_)), "got {:?}", err);
}
