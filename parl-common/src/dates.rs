//! French date display for article dates and analysis timestamps
//!
//! Inputs are whatever the upstream pipeline wrote: RFC 3339, RFC 2822 (news
//! feeds), naive ISO date-times or plain dates. Times are shown in the offset
//! the value was written with; naive values are read as UTC.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::text::is_missing;

const MONTHS_SHORT: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const NAIVE_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parses a date or date-time in any of the accepted shapes.
pub fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Some(parsed);
    }
    let utc = FixedOffset::east_opt(0)?;
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return utc.from_local_datetime(&naive).single();
        }
    }
    for format in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return utc.from_local_datetime(&naive).single();
        }
    }
    None
}

fn short_date(parsed: &DateTime<FixedOffset>) -> String {
    format!(
        "{} {} {}",
        parsed.day(),
        MONTHS_SHORT[parsed.month0() as usize],
        parsed.year()
    )
}

/// Article date as "12 janv. 2024".
///
/// ```
/// use parl_common::dates::format_date;
///
/// assert_eq!(format_date(Some("2024-01-12")), "12 janv. 2024");
/// assert_eq!(format_date(None), "Date inconnue");
/// assert_eq!(format_date(Some("hier")), "hier");
/// ```
pub fn format_date(value: Option<&str>) -> String {
    if is_missing(value) {
        return "Date inconnue".to_string();
    }
    let raw = value.unwrap_or_default();
    match parse_date(raw) {
        Some(parsed) => short_date(&parsed),
        None => raw.to_string(),
    }
}

/// Analysis timestamp as "12 janv. 2024, 14:05".
pub fn format_analysis_timestamp(value: Option<&str>) -> String {
    if is_missing(value) {
        return "Date d'analyse inconnue".to_string();
    }
    let raw = value.unwrap_or_default();
    match parse_date(raw) {
        Some(parsed) => format!(
            "{}, {:02}:{:02}",
            short_date(&parsed),
            parsed.hour(),
            parsed.minute()
        ),
        None => raw.to_string(),
    }
}

/// Milliseconds since the epoch for sorting; missing or unreadable dates sort as 0.
pub fn sort_key(value: Option<&str>) -> i64 {
    value
        .and_then(parse_date)
        .map(|parsed| parsed.with_timezone(&Utc).timestamp_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date_shapes() {
        assert_eq!(format_date(Some("2024-02-03T10:00:00Z")), "3 févr. 2024");
        assert_eq!(format_date(Some("Tue, 13 Aug 2024 08:30:00 +0200")), "13 août 2024");
        assert_eq!(format_date(Some("2023-12-31 23:59:59")), "31 déc. 2023");
        assert_eq!(format_date(Some("2024/05/01")), "1 mai 2024");
    }

    #[test]
    fn test_format_date_missing_and_raw() {
        assert_eq!(format_date(Some("nan")), "Date inconnue");
        assert_eq!(format_date(Some("  ")), "Date inconnue");
        assert_eq!(format_date(Some("il y a 3 jours")), "il y a 3 jours");
    }

    #[test]
    fn test_analysis_timestamp() {
        assert_eq!(
            format_analysis_timestamp(Some("2024-01-12T14:05:09+01:00")),
            "12 janv. 2024, 14:05"
        );
        assert_eq!(
            format_analysis_timestamp(Some("2024-07-01T08:00:00.123456")),
            "1 juil. 2024, 08:00"
        );
        assert_eq!(format_analysis_timestamp(None), "Date d'analyse inconnue");
        assert_eq!(format_analysis_timestamp(Some("bientot")), "bientot");
    }

    #[test]
    fn test_sort_key_orders_and_defaults() {
        let older = sort_key(Some("2023-01-01"));
        let newer = sort_key(Some("2024-01-01T00:00:00Z"));
        assert!(newer > older);
        assert_eq!(sort_key(Some("n/a")), 0);
        assert_eq!(sort_key(None), 0);
    }
}
