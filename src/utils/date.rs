//! Lenient date parsing and the fixed output date formats.
//!
//! Frontmatter dates are written by hand, so a number of human layouts are
//! accepted. Values without an offset are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;
use std::{sync::LazyLock, time::SystemTime};

/// Date-only layouts, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%B %d, %Y", // July 1, 2025
    "%b %d, %Y", // Jul 1, 2025
    "%B %d %Y",  // July 1 2025
    "%b %d %Y",  // Jul 1 2025
    "%d %B %Y",  // 1 July 2025
    "%d %b %Y",  // 1 Jul 2025
    "%Y-%m-%d",  // 2025-07-01
    "%Y/%m/%d",  // 2025/07/01
    "%m/%d/%Y",  // 07/01/2025
];

/// Date + time layouts without offset, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%B %d, %Y %H:%M",
    "%b %d, %Y %H:%M",
    "%m/%d/%Y %H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

/// Parse a human-written date.
///
/// Accepts RFC 3339, RFC 2822 and the layouts in [`DATE_FORMATS`] /
/// [`DATETIME_FORMATS`]. Ordinal suffixes (`1st`, `22nd`) and a leading
/// weekday (`Tuesday, July 1, 2025`) are tolerated.
pub fn parse_lenient(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.with_timezone(&Utc));
    }

    let normalized = normalize(input);
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
        .or_else(|| {
            DATE_FORMATS.iter().find_map(|fmt| {
                NaiveDate::parse_from_str(&normalized, fmt)
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            })
        })
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse a date plus an optional separate time-of-day field (`15:04`).
///
/// The time only applies when the date carried no time of its own.
pub fn parse_with_time(date: &str, time: Option<&str>) -> Option<DateTime<Utc>> {
    let parsed = parse_lenient(date)?;
    let Some(time) = time.map(str::trim).filter(|t| !t.is_empty()) else {
        return Some(parsed);
    };
    if parsed.time() != NaiveTime::MIN {
        return Some(parsed);
    }

    match TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time, fmt).ok())
    {
        Some(t) => Some(Utc.from_utc_datetime(&parsed.date_naive().and_time(t))),
        None => Some(parsed),
    }
}

/// Strip weekday prefixes and ordinal suffixes.
fn normalize(input: &str) -> String {
    static RE_WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun)[a-z]*,?\s+").unwrap()
    });
    static RE_ORDINAL: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").unwrap());

    let without_weekday = RE_WEEKDAY.replace(input, "");
    let without_ordinal = RE_ORDINAL.replace_all(&without_weekday, "$1");
    without_ordinal.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Convert a filesystem timestamp, used when a post has no usable date.
pub fn from_system_time(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

// ============================================================================
// Output formats
// ============================================================================

/// Index listing: `1 Jul`.
pub fn format_compact(date: &DateTime<Utc>) -> String {
    date.format("%-d %b").to_string()
}

/// Post detail page: `July 1, 2025`.
pub fn format_long(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Feed `pubDate` / `lastBuildDate`: `Tue, 01 Jul 2025 00:00:00 +0000`.
pub fn format_rfc822(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S %z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn ymd(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_long_month_format() {
        assert_eq!(parse_lenient("July 1, 2025"), Some(ymd(2025, 7, 1)));
        assert_eq!(parse_lenient("June 20, 2025"), Some(ymd(2025, 6, 20)));
        assert_eq!(parse_lenient("Jul 1, 2025"), Some(ymd(2025, 7, 1)));
    }

    #[test]
    fn test_parse_iso_formats() {
        assert_eq!(parse_lenient("2025-07-01"), Some(ymd(2025, 7, 1)));
        assert_eq!(parse_lenient("2025/07/01"), Some(ymd(2025, 7, 1)));

        let dt = parse_lenient("2025-07-01 14:30").unwrap();
        assert_eq!((dt.hour(), dt.minute()), (14, 30));

        let dt = parse_lenient("2025-07-01T10:00:00+02:00").unwrap();
        assert_eq!(dt.hour(), 8);
    }

    #[test]
    fn test_parse_human_variants() {
        assert_eq!(parse_lenient("1 July 2025"), Some(ymd(2025, 7, 1)));
        assert_eq!(parse_lenient("July 1st, 2025"), Some(ymd(2025, 7, 1)));
        assert_eq!(parse_lenient("Tuesday, July 1, 2025"), Some(ymd(2025, 7, 1)));
        assert_eq!(parse_lenient("07/01/2025"), Some(ymd(2025, 7, 1)));
        assert_eq!(
            parse_lenient("Tue, 01 Jul 2025 00:00:00 +0000"),
            Some(ymd(2025, 7, 1))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_lenient(""), None);
        assert_eq!(parse_lenient("sometime last summer"), None);
        assert_eq!(parse_lenient("2025-13-45"), None);
    }

    #[test]
    fn test_parse_with_time_field() {
        let dt = parse_with_time("July 1, 2025", Some("15:04")).unwrap();
        assert_eq!((dt.day(), dt.hour(), dt.minute()), (1, 15, 4));

        // explicit time in the date wins
        let dt = parse_with_time("2025-07-01 09:00", Some("15:04")).unwrap();
        assert_eq!(dt.hour(), 9);

        // unparseable time is ignored
        assert_eq!(parse_with_time("July 1, 2025", Some("noon")), Some(ymd(2025, 7, 1)));
    }

    #[test]
    fn test_output_formats() {
        let dt = ymd(2025, 7, 1);
        assert_eq!(format_compact(&dt), "1 Jul");
        assert_eq!(format_long(&dt), "July 1, 2025");
        assert_eq!(format_rfc822(&dt), "Tue, 01 Jul 2025 00:00:00 +0000");

        let dt = Utc.with_ymd_and_hms(2024, 12, 25, 18, 5, 9).unwrap();
        assert_eq!(format_compact(&dt), "25 Dec");
        assert_eq!(format_long(&dt), "December 25, 2024");
        assert_eq!(format_rfc822(&dt), "Wed, 25 Dec 2024 18:05:09 +0000");
    }
}
