use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::booking_types::BookingError;

/// An inclusive day-granularity interval. Values are date-only; wire
/// payloads deserialize straight into `NaiveDate`, so time-of-day and
/// timezone never enter the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the range
    #[serde(rename = "start_date")]
    pub start: NaiveDate,
    /// Last day of the range, inclusive
    #[serde(rename = "end_date")]
    pub end: NaiveDate,
}

impl DateRange {
    /// Builds a range, rejecting `start > end`. A single-day range
    /// (start == end) is valid.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, BookingError> {
        if start > end {
            return Err(BookingError::InvalidDateRange);
        }
        Ok(Self { start, end })
    }

    /// True when the two ranges share at least one calendar day.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// True when `inner` lies entirely within this range.
    pub fn contains(&self, inner: &DateRange) -> bool {
        self.start <= inner.start && inner.end <= self.end
    }

    /// Iterates every day of the range, inclusive on both ends.
    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        std::iter::successors(Some(self.start), |d| d.succ_opt())
            .take_while(move |d| *d <= self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rejects_inverted_range() {
        let result = DateRange::new(date(2024, 6, 10), date(2024, 6, 5));
        assert!(matches!(result, Err(BookingError::InvalidDateRange)));
    }

    #[test]
    fn test_single_day_range_is_valid() {
        let range = DateRange::new(date(2024, 6, 5), date(2024, 6, 5)).unwrap();
        assert!(range.overlaps(&range));
        assert_eq!(range.days().count(), 1);
    }

    #[test]
    fn test_overlap_on_shared_day() {
        let a = DateRange::new(date(2024, 6, 5), date(2024, 6, 10)).unwrap();
        let b = DateRange::new(date(2024, 6, 8), date(2024, 6, 15)).unwrap();

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_overlap_on_touching_endpoints() {
        let a = DateRange::new(date(2024, 6, 5), date(2024, 6, 10)).unwrap();
        let b = DateRange::new(date(2024, 6, 10), date(2024, 6, 12)).unwrap();

        // Inclusive ranges sharing a single endpoint day do overlap.
        assert!(a.overlaps(&b));
    }

    #[test]
    fn test_disjoint_ranges_do_not_overlap() {
        let a = DateRange::new(date(2024, 6, 5), date(2024, 6, 10)).unwrap();
        let b = DateRange::new(date(2024, 6, 11), date(2024, 6, 15)).unwrap();

        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_containment() {
        let window = DateRange::new(date(2024, 6, 1), date(2024, 6, 30)).unwrap();
        let inside = DateRange::new(date(2024, 6, 5), date(2024, 6, 10)).unwrap();
        let past_end = DateRange::new(date(2024, 6, 29), date(2024, 7, 2)).unwrap();

        assert!(window.contains(&inside));
        assert!(window.contains(&window));
        assert!(!window.contains(&past_end));
    }

    #[test]
    fn test_days_spans_month_boundary() {
        let range = DateRange::new(date(2024, 6, 29), date(2024, 7, 2)).unwrap();
        let days: Vec<NaiveDate> = range.days().collect();

        assert_eq!(days.len(), 4);
        assert_eq!(days[0], date(2024, 6, 29));
        assert_eq!(days[3], date(2024, 7, 2));
    }
}
