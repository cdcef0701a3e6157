//! Date helper functions
//!
//! Post dates are display strings. They are parsed only to order the
//! collection and to normalise front-matter dates into the site format.

use chrono::{NaiveDate, NaiveDateTime};

/// Formats accepted for post dates, most specific first
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%b %d, %Y", "%B %d, %Y"];

/// Parse a date string in any of the supported formats
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    // RFC 3339 / ISO 8601 with offset
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Format a date for display using a chrono format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "%b %-d, %Y") // -> "Jan 28, 2026"
/// ```
pub fn format_date(date: &NaiveDate, format: &str) -> String {
    date.format(format).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_dates() {
        let d = parse_date("2024-01-15 10:30:00").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(parse_date("2024/01/15"), Some(d));
        assert_eq!(parse_date("2024-01-15T08:00:00+09:00"), Some(d));
    }

    #[test]
    fn test_parse_display_dates() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 28).unwrap();
        assert_eq!(parse_date("Jan 28, 2026"), Some(d));
        assert_eq!(parse_date("January 28, 2026"), Some(d));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_date("sometime soon"), None);
    }

    #[test]
    fn test_format_date() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(format_date(&d, "%b %-d, %Y"), "Jan 5, 2026");
    }
}
