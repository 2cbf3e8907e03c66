//! Date range handling for budget windows
//!
//! Budgets accrue transactions whose document date falls inside an inclusive
//! `[start, end]` window, so the range type here is inclusive on both ends.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to date range construction
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// An inclusive calendar date range
///
/// A single-day window (`start == end`) is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a new range, validating that start does not exceed end
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodError> {
        if start > end {
            return Err(PeriodError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the start of the range (inclusive)
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Returns the end of the range (inclusive)
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Checks whether a date falls within the range, boundaries included
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Checks whether this range overlaps another
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_valid_range() {
        let range = DateRange::new(date(2026, 1, 1), date(2026, 12, 31)).unwrap();
        assert_eq!(range.start(), date(2026, 1, 1));
        assert_eq!(range.end(), date(2026, 12, 31));
    }

    #[test]
    fn test_single_day_range() {
        assert!(DateRange::new(date(2026, 6, 1), date(2026, 6, 1)).is_ok());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = DateRange::new(date(2026, 12, 31), date(2026, 1, 1));
        assert!(matches!(result, Err(PeriodError::InvalidRange { .. })));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = DateRange::new(date(2026, 1, 1), date(2026, 3, 31)).unwrap();
        assert!(range.contains(date(2026, 1, 1)));
        assert!(range.contains(date(2026, 3, 31)));
        assert!(range.contains(date(2026, 2, 15)));
        assert!(!range.contains(date(2025, 12, 31)));
        assert!(!range.contains(date(2026, 4, 1)));
    }

    #[test]
    fn test_overlaps() {
        let q1 = DateRange::new(date(2026, 1, 1), date(2026, 3, 31)).unwrap();
        let q2 = DateRange::new(date(2026, 4, 1), date(2026, 6, 30)).unwrap();
        let h1 = DateRange::new(date(2026, 1, 1), date(2026, 6, 30)).unwrap();

        assert!(!q1.overlaps(&q2));
        assert!(q1.overlaps(&h1));
        assert!(q2.overlaps(&h1));
    }
}
