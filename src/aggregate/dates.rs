//! Capture timestamps to calendar-month buckets.

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between the date and time halves of a capture timestamp.
pub const DATE_TIME_SEPARATOR: char = 'T';

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Calendar month bucket, displayed as `YYYY-MM`.
///
/// Field order makes the derived ordering chronological, which matches
/// plain string ordering of the display form for four-digit years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Returns `None` unless `year` fits in four digits and `month` is 1-12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (0..=9999).contains(&year) && (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Human-readable `Jul-2015` form. Does not sort as a string, so only
    /// used for axis labels.
    pub fn month_year_label(&self) -> String {
        format!("{}-{:04}", MONTH_ABBR[(self.month - 1) as usize], self.year)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("{s:?} is not in YYYY-MM form"))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(format!("{s:?} is not in YYYY-MM form"));
        }
        let year: i32 = year
            .parse()
            .map_err(|_| format!("{s:?} has an invalid year"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("{s:?} has an invalid month"))?;
        Self::new(year, month).ok_or_else(|| format!("{s:?} is out of range"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatErrorKind {
    #[error("has no date/time separator")]
    MissingSeparator,
    #[error("does not start with a valid calendar date")]
    InvalidDate,
    #[error("is not a text value")]
    NotText,
}

/// A capture timestamp that cannot be turned into a month bucket.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("capture time at row {row} ({value:?}) {kind}")]
pub struct FormatError {
    pub row: usize,
    pub value: String,
    pub kind: FormatErrorKind,
}

impl FormatError {
    pub fn new(row: usize, value: impl Into<String>, kind: FormatErrorKind) -> Self {
        Self {
            row,
            value: value.into(),
            kind,
        }
    }
}

/// Reduce one raw capture timestamp to its month bucket.
pub fn capture_month(row: usize, raw: &str) -> Result<YearMonth, FormatError> {
    let (date, _time) = raw
        .split_once(DATE_TIME_SEPARATOR)
        .ok_or_else(|| FormatError::new(row, raw, FormatErrorKind::MissingSeparator))?;

    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| FormatError::new(row, raw, FormatErrorKind::InvalidDate))?;

    YearMonth::new(date.year(), date.month())
        .ok_or_else(|| FormatError::new(row, raw, FormatErrorKind::InvalidDate))
}

/// Map every capture timestamp to its month, failing on the first
/// malformed row. Output has the same length and order as the input.
pub fn normalize_capture_times<S: AsRef<str>>(rows: &[S]) -> Result<Vec<YearMonth>, FormatError> {
    rows.iter()
        .enumerate()
        .map(|(i, raw)| capture_month(i, raw.as_ref()))
        .collect()
}

/// Like [`normalize_capture_times`] but keeps going past malformed rows,
/// returning them alongside the months that did parse.
pub fn normalize_capture_times_lenient<S: AsRef<str>>(
    rows: &[S],
) -> (Vec<YearMonth>, Vec<FormatError>) {
    let mut months = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();

    for (i, raw) in rows.iter().enumerate() {
        match capture_month(i, raw.as_ref()) {
            Ok(month) => months.push(month),
            Err(e) => rejected.push(e),
        }
    }

    (months, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn looks_like_year_month(s: &str) -> bool {
        let b = s.as_bytes();
        b.len() == 7
            && b[4] == b'-'
            && b[..4].iter().all(u8::is_ascii_digit)
            && b[5..].iter().all(u8::is_ascii_digit)
    }

    #[test]
    fn test_normalize_capture_times() {
        let rows = ["2015-07-01T10:00:00", "2015-07-15T09:00:00", "2015-08-01T12:00:00"];
        let months = normalize_capture_times(&rows).unwrap();

        assert_eq!(months, vec![ym(2015, 7), ym(2015, 7), ym(2015, 8)]);
        let keys: Vec<String> = months.iter().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["2015-07", "2015-07", "2015-08"]);
    }

    #[test]
    fn test_output_matches_input_length_and_pattern() {
        let rows = [
            "2009-01-31T23:59:59",
            "2017-10-02T08:15:00.25",
            "0999-12-01T00:00:00",
            "2020-02-29T12:00:00+02:00",
        ];
        let months = normalize_capture_times(&rows).unwrap();

        assert_eq!(months.len(), rows.len());
        for month in &months {
            assert!(looks_like_year_month(&month.to_string()), "{month}");
        }
    }

    #[test]
    fn test_splits_at_first_separator() {
        let month = capture_month(0, "2015-07-01T10:00:00T").unwrap();
        assert_eq!(month, ym(2015, 7));
    }

    #[test]
    fn test_missing_separator_is_format_error() {
        let err = normalize_capture_times(&["2015-07-01T10:00:00", "20150701"]).unwrap_err();
        assert_eq!(err.row, 1);
        assert_eq!(err.value, "20150701");
        assert_eq!(err.kind, FormatErrorKind::MissingSeparator);
    }

    #[test]
    fn test_invalid_date_is_format_error() {
        let err = capture_month(3, "2015-13-01T00:00:00").unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::InvalidDate);
        assert_eq!(err.row, 3);

        let err = capture_month(0, "yesterdayT10:00").unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::InvalidDate);
    }

    #[test]
    fn test_empty_input() {
        let rows: [&str; 0] = [];
        assert!(normalize_capture_times(&rows).unwrap().is_empty());
    }

    #[test]
    fn test_lenient_collects_rejected_rows() {
        let rows = ["2015-07-01T10:00:00", "garbage", "2016-01-05T10:00:00", "2016-02-30T01:00:00"];
        let (months, rejected) = normalize_capture_times_lenient(&rows);

        assert_eq!(months, vec![ym(2015, 7), ym(2016, 1)]);
        let rows: Vec<usize> = rejected.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![1, 3]);
    }

    #[test]
    fn test_year_month_ordering_matches_string_ordering() {
        let mut months = vec![ym(2016, 1), ym(2015, 12), ym(2015, 2), ym(999, 9)];
        let mut keys: Vec<String> = months.iter().map(ToString::to_string).collect();
        months.sort();
        keys.sort();

        let sorted: Vec<String> = months.iter().map(ToString::to_string).collect();
        assert_eq!(sorted, keys);
    }

    #[test]
    fn test_year_month_from_str() {
        assert_eq!("2015-08".parse::<YearMonth>().unwrap(), ym(2015, 8));
        assert!("2015-8".parse::<YearMonth>().is_err());
        assert!("2015-00".parse::<YearMonth>().is_err());
        assert!("Aug-2015".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_month_year_label() {
        assert_eq!(ym(2017, 10).month_year_label(), "Oct-2017");
        assert_eq!(ym(2015, 1).month_year_label(), "Jan-2015");
    }

    /// A well-formed capture time and the month it belongs to.
    fn capture_time() -> impl Strategy<Value = (String, YearMonth)> {
        let suffix = "(\\.[0-9]{1,3})?(Z|[+-][0-9]{2}:[0-9]{2})?";
        (0i32..=9999, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, suffix)
            .prop_map(|(year, month, day, hour, minute, suffix)| {
                let raw = format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:00{suffix}");
                (raw, ym(year, month))
            })
    }

    proptest! {
        #[test]
        fn prop_months_keep_length_and_pattern(
            rows in prop::collection::vec(capture_time(), 0..100)
        ) {
            let (raw, expected): (Vec<String>, Vec<YearMonth>) = rows.into_iter().unzip();
            let months = normalize_capture_times(&raw).unwrap();

            prop_assert_eq!(months.len(), raw.len());
            for month in &months {
                let key = month.to_string();
                prop_assert_eq!(key.len(), 7);
                prop_assert!(looks_like_year_month(&key), "{}", key);
            }
            prop_assert_eq!(months, expected);
        }

        #[test]
        fn prop_text_without_separator_is_rejected(raw in "[^T]{0,24}") {
            let err = capture_month(0, &raw).unwrap_err();
            prop_assert_eq!(err.kind, FormatErrorKind::MissingSeparator);
        }
    }
}
