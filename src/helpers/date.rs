//! Date helper functions
//!
//! Post dates stay strings end to end. These helpers only interpret them
//! where an ordering or a friendlier display is needed.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

/// Formats accepted when interpreting a front-matter date
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Today's date in UTC as `YYYY-MM-DD`
pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// The current year, for page footers
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Interpret a date string, returning `None` when no known format matches
///
/// # Examples
/// ```ignore
/// parse_date("2024-01-15")          // -> 2024-01-15 00:00:00
/// parse_date("2024-01-15 10:30")    // -> 2024-01-15 10:30:00
/// parse_date("next tuesday")        // -> None
/// ```
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // RFC 3339 / ISO 8601 with offset, compared in UTC
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_utc())
}

/// Format a date string as "January 15, 2024"; unknown formats pass through
pub fn long_date(s: &str) -> String {
    match parse_date(s) {
        Some(dt) => dt.format("%B %d, %Y").to_string(),
        None => s.to_string(),
    }
}
