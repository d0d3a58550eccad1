// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! Civil calendar collaborator.
//!
//! The instant engine only needs to turn a POSIX day count into a calendar
//! date (to key leap-second and ΔT lookups, and to render text) and back.
//! [`CivilDateProvider`] is that narrow seam; [`ProlepticGregorian`] is the
//! bundled implementation covering years ±999 999 999.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Smallest supported proleptic-Gregorian year.
pub const MIN_YEAR: i64 = -999_999_999;

/// Largest supported proleptic-Gregorian year.
pub const MAX_YEAR: i64 = 999_999_999;

/// A proleptic-Gregorian calendar date.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CivilDate {
    year: i64,
    month: u8,
    day: u8,
}

impl CivilDate {
    /// Validated constructor; `None` for impossible dates or years out of range.
    pub fn new(year: i64, month: u8, day: u8) -> Option<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) || !(1..=12).contains(&month) {
            return None;
        }
        if day == 0 || day > length_of_month(year, month) {
            return None;
        }
        Some(Self { year, month, day })
    }

    /// Date of a POSIX day number on the ISO calendar.
    pub(crate) const fn from_posix_day(day: i64) -> Self {
        let (year, month, day) = civil_from_days(day);
        Self { year, month, day }
    }

    #[inline]
    pub const fn year(&self) -> i64 {
        self.year
    }

    #[inline]
    pub const fn month(&self) -> u8 {
        self.month
    }

    #[inline]
    pub const fn day(&self) -> u8 {
        self.day
    }
}

impl fmt::Display for CivilDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (0..=9999).contains(&self.year) {
            write!(f, "{:04}", self.year)?;
        } else if self.year < 0 {
            write!(f, "-{:04}", -self.year)?;
        } else {
            write!(f, "+{:04}", self.year)?;
        }
        write!(f, "-{:02}-{:02}", self.month, self.day)
    }
}

/// Maps POSIX day numbers to calendar dates and back.
pub trait CivilDateProvider: Send + Sync + fmt::Debug {
    /// Calendar date of the given day count since 1970-01-01.
    fn date_from_posix_day(&self, day: i64) -> CivilDate;

    /// Day count since 1970-01-01 of the given date.
    fn posix_day_from_date(&self, date: CivilDate) -> i64;

    /// Number of days in the given month.
    fn length_of_month(&self, year: i64, month: u8) -> u8 {
        length_of_month(year, month)
    }
}

/// The ISO calendar extended backwards without any reform.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProlepticGregorian;

impl CivilDateProvider for ProlepticGregorian {
    fn date_from_posix_day(&self, day: i64) -> CivilDate {
        CivilDate::from_posix_day(day)
    }

    fn posix_day_from_date(&self, date: CivilDate) -> i64 {
        days_from_civil(date.year, date.month, date.day)
    }
}

// ---------------------------------------------------------------------------
// Gregorian day arithmetic (era based, valid for the whole supported range)
// ---------------------------------------------------------------------------

#[inline]
pub(crate) const fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[inline]
pub(crate) const fn length_of_month(year: i64, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Days since 1970-01-01 for a proleptic-Gregorian date.
pub(crate) const fn days_from_civil(year: i64, month: u8, day: u8) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = month as i64;
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Proleptic-Gregorian date for a day count since 1970-01-01.
pub(crate) const fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_days() {
        assert_eq!(days_from_civil(1970, 1, 1), 0);
        assert_eq!(days_from_civil(1972, 1, 1), 730);
        assert_eq!(days_from_civil(2012, 7, 1), 15_522);
        assert_eq!(civil_from_days(15_521), (2012, 6, 30));
        assert_eq!(civil_from_days(-1), (1969, 12, 31));
    }

    #[test]
    fn extreme_years() {
        let min = days_from_civil(MIN_YEAR, 1, 1);
        let max = days_from_civil(MAX_YEAR, 12, 31);
        assert_eq!(civil_from_days(min), (MIN_YEAR, 1, 1));
        assert_eq!(civil_from_days(max), (MAX_YEAR, 12, 31));
    }

    #[test]
    fn provider_roundtrip_around_leap_days() {
        let cal = ProlepticGregorian;
        for day in [-719_468, -1, 0, 59, 60, 11_016, 18_262] {
            let date = cal.date_from_posix_day(day);
            assert_eq!(cal.posix_day_from_date(date), day);
        }
        let feb29 = CivilDate::new(2000, 2, 29).unwrap();
        assert_eq!(cal.date_from_posix_day(cal.posix_day_from_date(feb29)), feb29);
    }

    #[test]
    fn validation_and_display() {
        assert!(CivilDate::new(1900, 2, 29).is_none());
        assert!(CivilDate::new(2024, 13, 1).is_none());
        assert_eq!(CivilDate::new(812, 3, 4).unwrap().to_string(), "0812-03-04");
        assert_eq!(CivilDate::new(-44, 3, 15).unwrap().to_string(), "-0044-03-15");
        assert_eq!(CivilDate::new(12_345, 1, 1).unwrap().to_string(), "+12345-01-01");
    }
}
