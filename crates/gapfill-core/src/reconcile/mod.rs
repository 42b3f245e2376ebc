//! Reconciliation: merge expected files, the remote listing and the local mirror.
//!
//! Each expected entry gets exactly one [`FileStatus`]. Scanning a site never
//! fails because the remote is unreachable; only a broken filename template or
//! an uncreatable output directory stops a site.

mod result;
mod scan;
mod status;

pub use result::{ScanResult, ScanStore};
pub use scan::{fetch_listing, reconcile_entry, scan_site, ListingState, ReconciledItem, ScanError, SiteScan};
pub use status::{FileStatus, StatusInputs};
