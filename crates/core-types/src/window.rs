use crate::error::CoreError;
use chrono::{DateTime, Days, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A half-open time interval `[start, end)`.
///
/// An instant equal to `start` is inside the window, one equal to `end` is not.
/// Windows with `start >= end` contain nothing; they are not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The calendar day `date` as seen from `offset`, i.e. local midnight to the next local midnight.
    pub fn for_day(date: NaiveDate, offset: FixedOffset) -> Result<Self, CoreError> {
        let next = date.checked_add_days(Days::new(1)).ok_or_else(|| {
            CoreError::InvalidInput("date".to_string(), format!("{date} has no following day"))
        })?;
        let start = local_midnight(date, offset)?;
        let end = local_midnight(next, offset)?;
        Ok(Self { start, end })
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> Result<DateTime<Utc>, CoreError> {
    let naive = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
        CoreError::InvalidInput("date".to_string(), format!("{date} has no midnight"))
    })?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            CoreError::InvalidInput("date".to_string(), format!("{date} is out of range"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, h, m, s).unwrap()
    }

    #[test]
    fn start_is_inclusive_end_is_exclusive() {
        let window = DateWindow::new(at(9, 0, 0), at(10, 0, 0));
        assert!(window.contains(at(9, 0, 0)));
        assert!(window.contains(at(9, 59, 59)));
        assert!(!window.contains(at(10, 0, 0)));
        assert!(!window.contains(at(8, 59, 59)));
    }

    #[test]
    fn inverted_window_is_empty() {
        let window = DateWindow::new(at(10, 0, 0), at(9, 0, 0));
        assert!(window.is_empty());
        assert!(!window.contains(at(9, 30, 0)));
    }

    #[test]
    fn day_window_respects_offset() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let window = DateWindow::for_day(date, plus_two).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 3, 9, 22, 0, 0).unwrap());
        assert_eq!(window.end - window.start, Duration::days(1));
    }
}
