// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! Zone offsets and the zone-local timestamp view.
//!
//! The engine does not model time-zone databases.  Field adjustment only
//! needs the offset in force at an instant and for a local timestamp, which
//! is what [`ZoneRules`] provides.  [`FixedZone`] is the bundled rule set.

use std::fmt;

use crate::calendar::{days_from_civil, CivilDate};
use crate::error::{InstantError, InstantResult};
use crate::instant::UniversalInstant;
use crate::scales::{NANOS_PER_SECOND, SECONDS_PER_DAY};

/// Largest supported offset magnitude (18 h).
const MAX_OFFSET_SECONDS: i32 = 18 * 3_600;

const NANOS_PER_DAY: i64 = SECONDS_PER_DAY * NANOS_PER_SECOND;

/// Shift of local time against UTC.
///
/// Whole seconds plus an optional nanosecond fraction of the same sign.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ZoneOffset {
    seconds: i32,
    fraction: i32,
}

impl ZoneOffset {
    pub const UTC: Self = Self {
        seconds: 0,
        fraction: 0,
    };

    pub fn of_total_seconds(seconds: i32) -> InstantResult<Self> {
        Self::with_fraction(seconds, 0)
    }

    pub fn of_hours_minutes(hours: i32, minutes: i32) -> InstantResult<Self> {
        if hours != 0 && minutes != 0 && hours.signum() != minutes.signum() {
            return Err(InstantError::InvalidFieldValue {
                field: "offset minutes",
                value: i64::from(minutes),
            });
        }
        let seconds = hours
            .checked_mul(3_600)
            .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
            .ok_or(InstantError::InvalidFieldValue {
                field: "offset hours",
                value: i64::from(hours),
            })?;
        Self::of_total_seconds(seconds)
    }

    /// Offset with a sub-second part, e.g. a local mean time.
    pub fn with_fraction(seconds: i32, fraction: i32) -> InstantResult<Self> {
        if seconds.unsigned_abs() > MAX_OFFSET_SECONDS.unsigned_abs() {
            return Err(InstantError::InvalidFieldValue {
                field: "offset seconds",
                value: i64::from(seconds),
            });
        }
        let mixed_signs = seconds != 0 && fraction != 0 && seconds.signum() != fraction.signum();
        if u64::from(fraction.unsigned_abs()) >= NANOS_PER_SECOND as u64 || mixed_signs {
            return Err(InstantError::InvalidFieldValue {
                field: "offset fraction",
                value: i64::from(fraction),
            });
        }
        Ok(Self { seconds, fraction })
    }

    #[inline]
    pub const fn total_seconds(&self) -> i32 {
        self.seconds
    }

    #[inline]
    pub const fn fraction(&self) -> i32 {
        self.fraction
    }

    /// `true` if the offset is a whole number of minutes.
    #[inline]
    pub const fn is_whole_minutes(&self) -> bool {
        self.fraction == 0 && self.seconds % 60 == 0
    }

    #[inline]
    fn as_nanos(&self) -> i128 {
        i128::from(self.seconds) * i128::from(NANOS_PER_SECOND) + i128::from(self.fraction)
    }
}

impl fmt::Display for ZoneOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.seconds == 0 && self.fraction == 0 {
            return f.write_str("Z");
        }
        let sign = if self.seconds < 0 || self.fraction < 0 { '-' } else { '+' };
        let abs = self.seconds.unsigned_abs();
        write!(f, "{sign}{:02}:{:02}", abs / 3_600, abs / 60 % 60)?;
        if abs % 60 != 0 || self.fraction != 0 {
            write!(f, ":{:02}", abs % 60)?;
        }
        if self.fraction != 0 {
            write!(f, ".{:09}", self.fraction.unsigned_abs())?;
        }
        Ok(())
    }
}

/// Offset lookup used by field adjustment.
pub trait ZoneRules: Send + Sync + fmt::Debug {
    /// Offset in force at `instant`.
    fn offset_at(&self, instant: &UniversalInstant) -> ZoneOffset;

    /// Offset to resolve `local` back onto the time line.
    fn offset_for_local(&self, local: &LocalDateTime) -> ZoneOffset;

    /// Strict zones reject local timestamps removed by a negative leap second.
    fn is_strict(&self) -> bool {
        false
    }
}

/// A zone with one constant offset.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FixedZone {
    offset: ZoneOffset,
    strict: bool,
}

impl FixedZone {
    pub const UTC: Self = Self {
        offset: ZoneOffset::UTC,
        strict: false,
    };

    pub const fn new(offset: ZoneOffset) -> Self {
        Self {
            offset,
            strict: false,
        }
    }

    /// Same offset, rejecting removed local seconds.
    pub const fn strict(self) -> Self {
        Self {
            offset: self.offset,
            strict: true,
        }
    }
}

impl ZoneRules for FixedZone {
    fn offset_at(&self, _instant: &UniversalInstant) -> ZoneOffset {
        self.offset
    }

    fn offset_for_local(&self, _local: &LocalDateTime) -> ZoneOffset {
        self.offset
    }

    fn is_strict(&self) -> bool {
        self.strict
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// LocalDateTime
// ═══════════════════════════════════════════════════════════════════════════

/// Wall-clock timestamp without offset.  Never shows a leap second.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalDateTime {
    date: CivilDate,
    nano_of_day: i64,
}

impl LocalDateTime {
    pub fn new(date: CivilDate, hour: u8, minute: u8, second: u8, nanosecond: u32) -> Option<Self> {
        if hour > 23 || minute > 59 || second > 59 || i64::from(nanosecond) >= NANOS_PER_SECOND {
            return None;
        }
        let seconds = i64::from(hour) * 3_600 + i64::from(minute) * 60 + i64::from(second);
        Some(Self {
            date,
            nano_of_day: seconds * NANOS_PER_SECOND + i64::from(nanosecond),
        })
    }

    /// Wall-clock view of `instant` under `offset`.
    pub fn of_instant(instant: &UniversalInstant, offset: ZoneOffset) -> Self {
        let total = i128::from(instant.posix_seconds()) * i128::from(NANOS_PER_SECOND)
            + i128::from(instant.nanosecond())
            + offset.as_nanos();
        let day = total.div_euclid(i128::from(NANOS_PER_DAY)) as i64;
        let nano_of_day = total.rem_euclid(i128::from(NANOS_PER_DAY)) as i64;
        Self::from_parts(day, nano_of_day)
    }

    /// Instant shown as `self` under `offset`.
    pub fn at_offset(&self, offset: ZoneOffset) -> InstantResult<UniversalInstant> {
        let total = i128::from(self.posix_day()) * i128::from(NANOS_PER_DAY)
            + i128::from(self.nano_of_day)
            - offset.as_nanos();
        let nano_unit = i128::from(NANOS_PER_SECOND);
        let posix = i64::try_from(total.div_euclid(nano_unit))
            .map_err(|_| InstantError::overflow("at_offset"))?;
        UniversalInstant::of_posix(posix, total.rem_euclid(nano_unit) as u32)
    }

    #[inline]
    pub const fn date(&self) -> CivilDate {
        self.date
    }

    #[inline]
    pub const fn hour(&self) -> u8 {
        (self.nano_of_day / (3_600 * NANOS_PER_SECOND)) as u8
    }

    #[inline]
    pub const fn minute(&self) -> u8 {
        (self.nano_of_day / (60 * NANOS_PER_SECOND) % 60) as u8
    }

    #[inline]
    pub const fn second(&self) -> u8 {
        (self.nano_of_day / NANOS_PER_SECOND % 60) as u8
    }

    #[inline]
    pub const fn nanosecond(&self) -> u32 {
        (self.nano_of_day % NANOS_PER_SECOND) as u32
    }

    #[inline]
    pub const fn nano_of_day(&self) -> i64 {
        self.nano_of_day
    }

    pub(crate) fn posix_day(&self) -> i64 {
        days_from_civil(self.date.year(), self.date.month(), self.date.day())
    }

    /// `nano_of_day` must lie in `0..NANOS_PER_DAY`.
    pub(crate) fn from_parts(day: i64, nano_of_day: i64) -> Self {
        Self {
            date: CivilDate::from_posix_day(day),
            nano_of_day,
        }
    }
}

impl fmt::Display for LocalDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}T{:02}:{:02}:{:02}",
            self.date,
            self.hour(),
            self.minute(),
            self.second()
        )?;
        if self.nanosecond() > 0 {
            write!(f, ",{:09}", self.nanosecond())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_display_and_checks() {
        assert_eq!(ZoneOffset::UTC.to_string(), "Z");
        let india = ZoneOffset::of_hours_minutes(5, 30).unwrap();
        assert_eq!(india.to_string(), "+05:30");
        assert!(india.is_whole_minutes());

        let lmt = ZoneOffset::with_fraction(-(3_600 + 15), -500_000_000).unwrap();
        assert_eq!(lmt.to_string(), "-01:00:15.500000000");
        assert!(!lmt.is_whole_minutes());

        assert!(ZoneOffset::of_total_seconds(19 * 3_600).is_err());
        assert!(ZoneOffset::with_fraction(10, -1).is_err());
        assert!(ZoneOffset::of_hours_minutes(-5, 30).is_err());
    }

    #[test]
    fn extreme_offset_arguments_are_rejected() {
        for seconds in [i32::MIN, i32::MAX, MAX_OFFSET_SECONDS + 1] {
            assert!(ZoneOffset::of_total_seconds(seconds).is_err(), "{seconds}");
        }
        assert!(ZoneOffset::with_fraction(0, i32::MIN).is_err());
        assert!(ZoneOffset::with_fraction(0, i32::MAX).is_err());
        assert!(ZoneOffset::of_hours_minutes(1_000_000, 0).is_err());
        assert!(ZoneOffset::of_hours_minutes(i32::MIN, i32::MIN).is_err());
        assert!(ZoneOffset::of_hours_minutes(0, i32::MAX).is_err());
        assert_eq!(
            ZoneOffset::of_total_seconds(-MAX_OFFSET_SECONDS).unwrap().total_seconds(),
            -MAX_OFFSET_SECONDS
        );
    }

    #[test]
    fn local_view_roundtrip() {
        let offset = ZoneOffset::of_hours_minutes(-3, -30).unwrap();
        // 1970-01-01T00:00:00.25Z
        let m = UniversalInstant::of_posix(0, 250_000_000).unwrap();
        let local = LocalDateTime::of_instant(&m, offset);
        assert_eq!(local.to_string(), "1969-12-31T20:30:00,250000000");
        assert_eq!(local.at_offset(offset).unwrap(), m);
    }

    #[test]
    fn fractional_offset_shifts_nanos() {
        let offset = ZoneOffset::with_fraction(0, 750_000_000).unwrap();
        let m = UniversalInstant::of_posix(10, 500_000_000).unwrap();
        let local = LocalDateTime::of_instant(&m, offset);
        assert_eq!((local.second(), local.nanosecond()), (11, 250_000_000));
        assert_eq!(local.at_offset(offset).unwrap(), m);
    }

    #[test]
    fn validated_constructor() {
        let date = CivilDate::new(2012, 6, 30).unwrap();
        assert!(LocalDateTime::new(date, 23, 59, 60, 0).is_none());
        let local = LocalDateTime::new(date, 23, 59, 59, 1).unwrap();
        assert_eq!(local.nano_of_day(), 86_399 * NANOS_PER_SECOND + 1);
    }
}
