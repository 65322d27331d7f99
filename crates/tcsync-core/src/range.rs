use crate::{Error, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// Inclusive bounds for every time-ranged query a check performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidRange(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The `days` days leading up to `end`.
    pub fn last_days(end: NaiveDateTime, days: u32) -> Result<Self> {
        let start = end
            .checked_sub_signed(Duration::days(i64::from(days)))
            .ok_or_else(|| Error::InvalidRange(format!("{} days before {}", days, end)))?;
        Self::new(start, end)
    }

    /// Whole calendar days: midnight of `start` through the last second of `end`.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        Self::new(start.and_time(NaiveTime::MIN), end.and_time(last_second))
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let result = TimeRange::from_dates(date(2024, 3, 2), date(2024, 3, 1));
        assert!(matches!(result, Err(Error::InvalidRange(_))));
    }

    #[test]
    fn test_from_dates_covers_whole_days() {
        let range = TimeRange::from_dates(date(2024, 3, 1), date(2024, 3, 1)).unwrap();
        assert_eq!(range.to_string(), "2024-03-01 00:00:00 to 2024-03-01 23:59:59");
    }

    #[test]
    fn test_last_days_counts_back_from_end() {
        let end = date(2024, 3, 10).and_hms_opt(12, 0, 0).unwrap();
        let range = TimeRange::last_days(end, 1).unwrap();

        assert_eq!(range.start_date(), date(2024, 3, 9));
        assert_eq!(range.end, end);
    }

    #[test]
    fn test_zero_days_is_a_point_range() {
        let end = date(2024, 3, 10).and_hms_opt(12, 0, 0).unwrap();
        let range = TimeRange::last_days(end, 0).unwrap();
        assert_eq!(range.start, range.end);
    }
}
