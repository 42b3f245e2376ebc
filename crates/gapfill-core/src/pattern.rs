//! Expected-file generation.
//!
//! Expands a site's filename template over a window of UTC days: one slot per
//! day for daily sites, 24 per day for hourly sites. Templates use strftime
//! directives (`%Y`, `%j`, `%H`, ...). With letter-hour naming the `%H`
//! directive is replaced by `a`..`x` before the rest of the template resolves.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Timelike, Utc};
use std::fmt::Write;

use crate::site::{Frequency, SiteConfig};

const HOUR_TOKEN: &str = "%H";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("site {site}: filename pattern is empty")]
    EmptyTemplate { site: String },
    #[error("site {site}: invalid filename pattern {template:?}")]
    InvalidTemplate { site: String, template: String },
}

/// One file a site should have published for a given slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedFileEntry {
    /// Start of the slot (midnight for daily sites, top of the hour for hourly).
    pub timestamp: DateTime<Utc>,
    pub filename: String,
    /// `YYYY-MM-DD` or `YYYY-MM-DD HH:00`.
    pub date_label: String,
}

/// Letter used for `hour` under the letter-hour convention (`0 -> 'a'`, `23 -> 'x'`).
pub fn letter_for_hour(hour: u32) -> Option<char> {
    if hour < 24 {
        char::from_u32('a' as u32 + hour)
    } else {
        None
    }
}

/// `t` truncated to the start of its UTC hour.
pub fn hour_start(t: DateTime<Utc>) -> DateTime<Utc> {
    day_start(t) + Duration::hours(i64::from(t.hour()))
}

fn day_start(t: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&t.date_naive().and_time(NaiveTime::MIN))
}

/// Apply a strftime template to `at`, rejecting malformed directives instead of panicking.
fn render(site: &SiteConfig, template: &str, at: DateTime<Utc>) -> Result<String, PatternError> {
    let invalid = || PatternError::InvalidTemplate {
        site: site.name.clone(),
        template: template.to_string(),
    };
    let items: Vec<Item<'_>> = StrftimeItems::new(template).collect();
    if items.iter().any(|i| matches!(i, Item::Error)) {
        return Err(invalid());
    }
    let mut out = String::with_capacity(template.len() + 8);
    write!(out, "{}", at.format_with_items(items.iter())).map_err(|_| invalid())?;
    Ok(out)
}

/// Expected entries for the `days_back` most recent UTC days (today included), newest day first.
pub fn generate(
    site: &SiteConfig,
    days_back: u32,
    now: DateTime<Utc>,
) -> Result<Vec<ExpectedFileEntry>, PatternError> {
    if site.pattern.trim().is_empty() {
        return Err(PatternError::EmptyTemplate {
            site: site.name.clone(),
        });
    }

    let per_day = match site.frequency {
        Frequency::Daily => 1,
        Frequency::Hourly => 24,
    };
    let mut expected = Vec::with_capacity(days_back as usize * per_day);

    for offset in 0..i64::from(days_back) {
        let midnight = day_start(now - Duration::days(offset));
        match site.frequency {
            Frequency::Daily => {
                expected.push(ExpectedFileEntry {
                    timestamp: midnight,
                    filename: render(site, &site.pattern, midnight)?,
                    date_label: midnight.format("%Y-%m-%d").to_string(),
                });
            }
            Frequency::Hourly => {
                for hour in 0..24u32 {
                    let slot = midnight + Duration::hours(i64::from(hour));
                    let filename = match letter_for_hour(hour) {
                        Some(letter) if site.letter_hour => {
                            let template = site.pattern.replace(HOUR_TOKEN, &letter.to_string());
                            render(site, &template, slot)?
                        }
                        _ => render(site, &site.pattern, slot)?,
                    };
                    expected.push(ExpectedFileEntry {
                        timestamp: slot,
                        filename,
                        date_label: slot.format("%Y-%m-%d %H:00").to_string(),
                    });
                }
            }
        }
    }
    Ok(expected)
}
