//! Per-station roll-up of a scan: last file on disk and the gaps in a look-back window.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::reconcile::{ReconciledItem, ScanResult};

pub const UNKNOWN_STATION: &str = "UNKNOWN";

/// Grouping key; ordering is network, station, site, rate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub network: String,
    pub station: String,
    pub site: String,
    pub rate: String,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {} | {}", self.network, self.station, self.site, self.rate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationSummary {
    pub key: GroupKey,
    /// Slot instant of the newest file present locally.
    pub last_seen: Option<DateTime<Utc>>,
    pub last_file: Option<String>,
    /// Gaps inside the window, newest first.
    pub missing: Vec<String>,
}

impl StationSummary {
    fn new(key: GroupKey) -> Self {
        Self {
            key,
            last_seen: None,
            last_file: None,
            missing: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

fn station_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([A-Z]{4}\d{2}[A-Z])").expect("static regex"))
}

/// Station id (four letters, two digits, one letter) found in `filename`,
/// case-insensitively; `UNKNOWN` if there is none.
pub fn station_from_filename(filename: &str) -> String {
    let upper = filename.to_uppercase();
    station_pattern()
        .captures(&upper)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_STATION.to_string())
}

fn group_key(item: &ReconciledItem) -> GroupKey {
    let site = &item.site;
    let station = if site.station_code.trim().is_empty() {
        station_from_filename(&item.filename)
    } else {
        site.station_code.clone()
    };
    GroupKey {
        network: site.network.clone(),
        station,
        site: site.name.clone(),
        rate: site.rate_label(),
    }
}

/// Summarize `result`, optionally for one site. Gaps older than `window_days`
/// and the growing current-hour file are not counted.
pub fn summarize(
    result: &ScanResult,
    window_days: u32,
    now: DateTime<Utc>,
    site_filter: Option<&str>,
) -> Vec<StationSummary> {
    let cutoff = now - Duration::days(i64::from(window_days));
    let mut groups: BTreeMap<GroupKey, (StationSummary, Vec<(DateTime<Utc>, String)>)> =
        BTreeMap::new();

    for item in result.items() {
        if site_filter.is_some_and(|name| name != item.site.name) {
            continue;
        }
        let key = group_key(item);
        let (summary, gaps) = groups
            .entry(key.clone())
            .or_insert_with(|| (StationSummary::new(key), Vec::new()));

        if item.local_exists && summary.last_seen.map_or(true, |t| item.timestamp > t) {
            summary.last_seen = Some(item.timestamp);
            summary.last_file = Some(item.filename.clone());
        }
        if item.status.is_gap() && !item.current && item.timestamp >= cutoff {
            gaps.push((item.timestamp, item.filename.clone()));
        }
    }

    groups
        .into_values()
        .map(|(mut summary, mut gaps)| {
            gaps.sort_by(|a, b| b.0.cmp(&a.0));
            summary.missing = gaps.into_iter().map(|(_, f)| f).collect();
            summary
        })
        .collect()
}

/// Human-readable byte count with one decimal; `—` for zero.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "—".to_string();
    }
    let mut value = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if value < 1024.0 {
            return format!("{:.1} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.1} TB", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_extracted_case_insensitively() {
        assert_eq!(station_from_filename("sitb00grc_20240101.t02"), "SITB00G");
        assert_eq!(station_from_filename("AUTH00GRC0320.24o"), "AUTH00G");
        assert_eq!(station_from_filename("x.dat"), UNKNOWN_STATION);
    }

    #[test]
    fn sizes_are_humanized() {
        assert_eq!(format_size(0), "—");
        assert_eq!(format_size(512), "512.0 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(3 * 1024u64.pow(4)), "3.0 TB");
    }

    #[test]
    fn complete_when_no_gaps() {
        let key = GroupKey {
            network: "NOA".into(),
            station: "AUTH00G".into(),
            site: "auth".into(),
            rate: "30s".into(),
        };
        let mut row = StationSummary::new(key);
        assert!(row.is_complete());
        row.missing.push("AUTH00GRC_20240101.dat".into());
        assert!(!row.is_complete());
    }

    #[test]
    fn group_key_display() {
        let key = GroupKey {
            network: "NOA".into(),
            station: "AUTH00G".into(),
            site: "auth".into(),
            rate: "30s [ExtClk]".into(),
        };
        assert_eq!(key.to_string(), "NOA | AUTH00G | auth | 30s [ExtClk]");
    }
}
