//! Calendar periods: the (year, month) dimension of a scope key.

use chrono::{DateTime, Datelike, FixedOffset, Utc};

use crate::ScopeError;

/// A calendar period (year + month) partitioning a document sequence.
///
/// Sequences restart per period by construction: a different period is a
/// different scope key, so `(2025, 3)` and `(2025, 4)` own fully independent
/// counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Smallest year accepted for explicitly supplied periods.
    pub const MIN_YEAR: i32 = 1;

    /// Largest year accepted for explicitly supplied periods.
    pub const MAX_YEAR: i32 = 9999;

    /// Validates an explicitly supplied period.
    pub fn new(year: i32, month: u32) -> Result<Self, ScopeError> {
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(ScopeError::YearOutOfRange(year));
        }
        if !(1..=12).contains(&month) {
            return Err(ScopeError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    /// Derives the period containing `instant`, interpreted at the given UTC
    /// offset.
    ///
    /// The offset matters near month boundaries: `2025-03-31T23:30:00Z` is
    /// still March in UTC but already April at `+02:00`.
    pub fn from_instant(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local = instant.with_timezone(&offset);
        Self {
            year: local.year(),
            month: local.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[test]
    fn accepts_valid_period() {
        let period = Period::new(2025, 3).unwrap();
        assert_eq!(period.year(), 2025);
        assert_eq!(period.month(), 3);
    }

    #[rstest]
    #[case(2025, 0, ScopeError::MonthOutOfRange(0))]
    #[case(2025, 13, ScopeError::MonthOutOfRange(13))]
    #[case(0, 3, ScopeError::YearOutOfRange(0))]
    #[case(10000, 3, ScopeError::YearOutOfRange(10000))]
    fn rejects_out_of_range(#[case] year: i32, #[case] month: u32, #[case] expected: ScopeError) {
        assert_eq!(Period::new(year, month).unwrap_err(), expected);
    }

    #[test]
    fn derives_from_instant_in_utc() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 31, 23, 30, 0).unwrap();
        let period = Period::from_instant(instant, FixedOffset::east_opt(0).unwrap());
        assert_eq!((period.year(), period.month()), (2025, 3));
    }

    #[test]
    fn offset_shifts_period_across_month_boundary() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 31, 23, 30, 0).unwrap();
        let warsaw_summer = FixedOffset::east_opt(2 * 3600).unwrap();
        let period = Period::from_instant(instant, warsaw_summer);
        assert_eq!((period.year(), period.month()), (2025, 4));
    }

    #[test]
    fn negative_offset_shifts_backwards() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 1, 0, 30, 0).unwrap();
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let period = Period::from_instant(instant, offset);
        assert_eq!((period.year(), period.month()), (2024, 12));
    }
}
