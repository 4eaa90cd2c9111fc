//! Time related utils.

use chrono::Utc;

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Create a new DateTime with current time.
pub fn now() -> DateTime {
    Utc::now()
}

/// Build a DateTime from seconds since the unix epoch.
///
/// Returns `None` if the timestamp is out of range.
pub fn from_unix_seconds(secs: i64) -> Option<DateTime> {
    DateTime::from_timestamp(secs, 0)
}

/// Format time into date: `20220301`
pub fn format_date(t: DateTime) -> String {
    t.format("%Y%m%d").to_string()
}

/// Format time into ISO8601: `20220313T072004Z`
pub fn format_iso8601(t: DateTime) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}
