//! Maintenance date normalization
//!
//! Source files carry dates in several regional formats. Parsing tries
//! a fixed list in order and keeps the first success, so ambiguous
//! strings like "03/04/2024" resolve by precedence (month/day wins).

use chrono::{Duration, NaiveDate};

/// Accepted formats, in try order. The order is the tie-break for
/// ambiguous day/month strings.
pub const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%m/%d/%y",
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d/%m/%y",
];

/// Parse a raw maintenance date cell. Returns `None` for blank or
/// unrecognized input; never fails. Callers decide whether to skip the
/// row or report it.
pub fn parse_maintenance_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Next maintenance date: the last maintenance midnight plus the
/// unrounded predicted elapsed days, truncated back to a date.
pub fn add_predicted_days(last: NaiveDate, days: f64) -> NaiveDate {
    let offset = Duration::milliseconds((days * 86_400_000.0) as i64);
    (last.and_hms_opt(0, 0, 0).expect("midnight is valid") + offset).date()
}

/// Monday and Sunday of the ISO week containing `today`
pub fn current_week_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    use chrono::Datelike;
    let start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    (start, start + Duration::days(6))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_day_precedence() {
        // Both %m/%d/%Y and %d/%m/%Y match; the earlier format wins.
        assert_eq!(parse_maintenance_date("03/04/2024"), Some(date(2024, 3, 4)));
    }

    #[test]
    fn test_each_format() {
        assert_eq!(parse_maintenance_date("12/31/2023"), Some(date(2023, 12, 31)));
        assert_eq!(parse_maintenance_date("12/31/23"), Some(date(2023, 12, 31)));
        assert_eq!(parse_maintenance_date("2023-12-31"), Some(date(2023, 12, 31)));
        assert_eq!(parse_maintenance_date("31-12-2023"), Some(date(2023, 12, 31)));
        assert_eq!(parse_maintenance_date("31/12/2023"), Some(date(2023, 12, 31)));
        assert_eq!(parse_maintenance_date("31/12/23"), Some(date(2023, 12, 31)));
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(parse_maintenance_date(""), None);
        assert_eq!(parse_maintenance_date("  "), None);
        assert_eq!(parse_maintenance_date("not a date"), None);
        assert_eq!(parse_maintenance_date("31/31/2023"), None);
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(parse_maintenance_date(" 01/02/2023 "), Some(date(2023, 1, 2)));
    }

    #[test]
    fn test_add_predicted_days_truncates_fraction() {
        // 10.6 days lands in the evening of day 10, which is still day 10.
        assert_eq!(add_predicted_days(date(2023, 1, 1), 10.6), date(2023, 1, 11));
        assert_eq!(add_predicted_days(date(2023, 1, 1), 0.0), date(2023, 1, 1));
        assert_eq!(add_predicted_days(date(2023, 1, 1), 300.0), date(2023, 10, 28));
    }

    #[test]
    fn test_current_week_bounds() {
        // 2024-06-12 is a Wednesday.
        let (start, end) = current_week_bounds(date(2024, 6, 12));
        assert_eq!(start, date(2024, 6, 10));
        assert_eq!(end, date(2024, 6, 16));
        // Monday maps onto itself.
        let (start, end) = current_week_bounds(date(2024, 6, 10));
        assert_eq!(start, date(2024, 6, 10));
        assert_eq!(end, date(2024, 6, 16));
    }
}
