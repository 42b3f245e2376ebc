//! Parsers for the directory listing formats the connectors request.

use super::RemoteListing;

/// Parse an FTP `MLSD` response (RFC 3659): `fact=value;fact=value; name`.
/// Only `type=file` entries are kept; a missing size fact counts as 0.
/// Returns `None` if no line looks like an MLSD entry.
pub fn parse_mlsd(body: &str) -> Option<RemoteListing> {
    let mut listing = RemoteListing::default();
    let mut recognized = false;
    for line in body.lines() {
        let line = line.trim_end_matches('\r');
        let Some((facts, name)) = line.split_once(' ') else {
            continue;
        };
        if !facts.contains('=') || name.is_empty() {
            continue;
        }
        recognized = true;
        let mut is_file = false;
        let mut size = 0u64;
        for fact in facts.split(';') {
            let Some((key, value)) = fact.split_once('=') else {
                continue;
            };
            if key.eq_ignore_ascii_case("type") {
                is_file = value.eq_ignore_ascii_case("file");
            } else if key.eq_ignore_ascii_case("size") {
                size = value.trim().parse().unwrap_or(0);
            }
        }
        if is_file {
            listing.insert(name, size);
        }
    }
    recognized.then_some(listing)
}

/// Parse an FTP `NLST` response: one name per line, possibly prefixed with a directory.
pub fn parse_name_list(body: &str) -> Vec<String> {
    body.lines()
        .map(|l| l.trim())
        .map(|l| l.rsplit('/').next().unwrap_or(l))
        .filter(|l| !l.is_empty() && *l != "." && *l != "..")
        .map(str::to_string)
        .collect()
}

/// Remainder of `line` after skipping `n` whitespace-separated fields.
fn after_fields(line: &str, n: usize) -> Option<&str> {
    let mut rest = line.trim_start();
    for _ in 0..n {
        let end = rest.find(char::is_whitespace)?;
        rest = rest[end..].trim_start();
    }
    (!rest.is_empty()).then_some(rest)
}

/// Parse a long (`ls -l` style) listing as returned for SFTP directory URLs.
/// Keeps regular files only; symlinks, directories and the `total` line are skipped.
pub fn parse_long_listing(body: &str) -> RemoteListing {
    let mut listing = RemoteListing::default();
    for line in body.lines() {
        let line = line.trim_end_matches('\r');
        let mut fields = line.split_whitespace();
        let Some(perms) = fields.next() else {
            continue;
        };
        if !perms.starts_with('-') {
            continue;
        }
        let Some(size) = fields.nth(3).and_then(|s| s.parse::<u64>().ok()) else {
            continue;
        };
        if let Some(name) = after_fields(line, 8) {
            listing.insert(name, size);
        }
    }
    listing
}
