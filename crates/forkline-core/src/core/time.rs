//! Relative-time formatting for branch rows.
//!
//! Recent activity reads as "Just now", "{m}m ago" or "{h}h ago". Anything a
//! day or older falls back to a calendar date in the local timezone.

use std::fmt::Display;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone, Utc};

/// Default calendar-date pattern (`1/15/2025`).
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

/// Which display bucket an elapsed duration falls into.
///
/// Variants are declared oldest-last so the derived ordering grows with
/// elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimeBucket {
    JustNow,
    Minutes(i64),
    Hours(i64),
    Date,
}

impl TimeBucket {
    /// Buckets by whole elapsed minutes. Future timestamps count as "just now".
    pub fn classify(ts: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let mins = now.signed_duration_since(ts).num_minutes();
        if mins < 1 {
            TimeBucket::JustNow
        } else if mins < MINUTES_PER_HOUR {
            TimeBucket::Minutes(mins)
        } else if mins < MINUTES_PER_DAY {
            TimeBucket::Hours(mins / MINUTES_PER_HOUR)
        } else {
            TimeBucket::Date
        }
    }
}

/// Formats `ts` relative to the current time.
pub fn format_relative_time(ts: DateTime<Utc>) -> String {
    format_relative_time_at(ts, Utc::now(), DEFAULT_DATE_FORMAT)
}

/// Formats `ts` relative to `now`, rendering old dates in the local timezone.
pub fn format_relative_time_at(ts: DateTime<Utc>, now: DateTime<Utc>, date_format: &str) -> String {
    format_relative_time_in(ts, now, date_format, &Local)
}

/// Same as [`format_relative_time_at`] with an explicit timezone for dates.
pub fn format_relative_time_in<Tz>(
    ts: DateTime<Utc>,
    now: DateTime<Utc>,
    date_format: &str,
    tz: &Tz,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match TimeBucket::classify(ts, now) {
        TimeBucket::JustNow => "Just now".to_string(),
        TimeBucket::Minutes(m) => format!("{m}m ago"),
        TimeBucket::Hours(h) => format!("{h}h ago"),
        TimeBucket::Date => {
            let pattern = if is_valid_date_format(date_format) {
                date_format
            } else {
                DEFAULT_DATE_FORMAT
            };
            ts.with_timezone(tz).format(pattern).to_string()
        }
    }
}

/// Parses an RFC 3339 string and formats it relative to `now`.
///
/// Input that does not parse is returned verbatim.
pub fn format_relative_timestamp(raw: &str, now: DateTime<Utc>, date_format: &str) -> String {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(parsed) => format_relative_time_at(parsed.with_timezone(&Utc), now, date_format),
        Err(_) => raw.to_string(),
    }
}

/// Returns true when `pattern` is a non-empty strftime pattern chrono accepts.
pub fn is_valid_date_format(pattern: &str) -> bool {
    !pattern.trim().is_empty() && !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}
