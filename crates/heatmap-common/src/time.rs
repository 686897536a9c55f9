//! Calendar-quarter bucketing for sample dates.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::collections::BTreeMap;

/// UTC timestamp of the first instant of a calendar quarter.
pub type QuarterStart = DateTime<Utc>;

/// Datetime layouts accepted without an explicit offset (assumed UTC).
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%d %B %Y",
    "%B %d, %Y",
];

/// Parse a sample date string into a UTC instant.
///
/// Accepts RFC 3339 (offsets are converted to UTC), ISO-like datetimes and
/// the common date-only layouts found in exported spreadsheets.
pub fn parse_sample_date(value: &str) -> Option<DateTime<Utc>> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|ndt| Utc.from_utc_datetime(&ndt));
        }
    }

    None
}

/// Bucket an instant to the start of its calendar quarter.
pub fn bucket(dt: &DateTime<Utc>) -> QuarterStart {
    let month0 = dt.month0();
    let start_month = (month0 / 3) * 3 + 1;
    // Day 1 of a month in 1..=12 always exists.
    let start = NaiveDate::from_ymd_opt(dt.year(), start_month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_else(|| dt.naive_utc());
    Utc.from_utc_datetime(&start)
}

/// Map a date string to its quarter start, or `None` if it does not parse.
pub fn quarter_start(value: &str) -> Option<QuarterStart> {
    parse_sample_date(value).map(|dt| bucket(&dt))
}

/// Render a quarter start as `"<year> Q<n>"`.
pub fn quarter_label(ts: &QuarterStart) -> String {
    format!("{} Q{}", ts.year(), ts.month0() / 3 + 1)
}

/// Slider marks for a quarter axis: first, last and every Q1.
pub fn quarter_marks(axis: &[QuarterStart]) -> BTreeMap<usize, String> {
    let mut marks = BTreeMap::new();
    let Some(last) = axis.len().checked_sub(1) else {
        return marks;
    };

    marks.insert(0, quarter_label(&axis[0]));
    marks.insert(last, quarter_label(&axis[last]));
    for (i, q) in axis.iter().enumerate() {
        if q.month() == 1 {
            marks.insert(i, quarter_label(q));
        }
    }
    marks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_same_quarter_for_april_through_june() {
        let april = quarter_start("2024-04-01").unwrap();
        let may = quarter_start("2024-05-10").unwrap();
        let june = quarter_start("2024-06-30T23:59:59").unwrap();
        let july = quarter_start("2024-07-01").unwrap();

        assert_eq!(april, may);
        assert_eq!(may, june);
        assert_ne!(june, july);
        assert_eq!(april, Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_label() {
        assert_eq!(quarter_label(&quarter_start("2024-05-10").unwrap()), "2024 Q2");
        assert_eq!(quarter_label(&quarter_start("2023-02-01").unwrap()), "2023 Q1");
        assert_eq!(quarter_label(&quarter_start("12/31/2022").unwrap()), "2022 Q4");
    }

    #[test]
    fn test_offsets_convert_to_utc() {
        // 2024-03-31T22:00-05:00 is already April 1st in UTC.
        let q = quarter_start("2024-03-31T22:00:00-05:00").unwrap();
        assert_eq!(quarter_label(&q), "2024 Q2");
        assert_eq!(q.hour(), 0);
    }

    #[test]
    fn test_unparseable() {
        assert!(quarter_start("").is_none());
        assert!(quarter_start("not a date").is_none());
        assert!(quarter_start("2024-13-01").is_none());
    }

    #[test]
    fn test_marks() {
        let axis: Vec<_> = ["2022-10-01", "2023-01-01", "2023-04-01", "2024-01-01", "2024-04-01"]
            .iter()
            .filter_map(|s| quarter_start(s))
            .collect();
        let marks = quarter_marks(&axis);

        assert_eq!(marks.len(), 4);
        assert_eq!(marks[&0], "2022 Q4");
        assert_eq!(marks[&1], "2023 Q1");
        assert_eq!(marks[&3], "2024 Q1");
        assert_eq!(marks[&4], "2024 Q2");
        assert!(quarter_marks(&[]).is_empty());
    }
}
