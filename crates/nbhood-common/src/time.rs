//! Time handling utilities for forecast coordinates.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Canonical epoch unit used when comparing time coordinates.
pub const EPOCH_HOURS: &str = "hours since 1970-01-01 00:00:00";

/// Hours elapsed since the Unix epoch.
pub fn epoch_hours(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp() as f64 / 3600.0 + f64::from(dt.timestamp_subsec_nanos()) / 3.6e12
}

/// Inverse of [`epoch_hours`], rounded to the nearest second.
pub fn from_epoch_hours(hours: f64) -> DateTime<Utc> {
    let seconds = (hours * 3600.0).round() as i64;
    DateTime::UNIX_EPOCH + Duration::seconds(seconds)
}

/// Parse the reference datetime of a "<unit> since <datetime>" string.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM-DD HH:MM` and a bare date. A trailing `UTC`/`Z` is ignored.
pub fn parse_reference_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let s = s
        .trim_end_matches("UTC")
        .trim_end_matches('Z')
        .trim();

    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}
