// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! Leap-second aware universal instant.
//!
//! [`UniversalInstant`] stores POSIX seconds, a nanosecond fraction and a
//! flag marking an inserted leap second.  The flag is what tells
//! `2012-06-30T23:59:60Z` apart from `23:59:59Z`: both share the same POSIX
//! second.
//!
//! Two arithmetic families coexist:
//!
//! | Units | Axis | Leap seconds |
//! |-------|------|--------------|
//! | [`SiUnit`] | continuous UTC since 1972 | counted as real ticks |
//! | [`TimeUnit`] | POSIX | ignored (civil arithmetic) |
//!
//! Instants are immutable `Copy` values; every operation returns a new one.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::calendar::{days_from_civil, CivilDate, MAX_YEAR, MIN_YEAR};
use crate::context::TimeContext;
use crate::convert::{utc_elapsed, ScaleConverter};
use crate::error::{ErrorKind, InstantError, InstantResult};
use crate::scales::{
    TimeScale, NANOS_PER_SECOND, POSIX_GPS_DELTA, POSIX_UTC_DELTA, SECONDS_PER_DAY, UTC_TAI_DELTA,
};
use crate::units::{SiUnit, TimeUnit};

/// POSIX second of −999 999 999-01-01T00:00:00Z.
const MIN_LIMIT: i64 = days_from_civil(MIN_YEAR, 1, 1) * SECONDS_PER_DAY;

/// POSIX second of +999 999 999-12-31T23:59:59Z.
const MAX_LIMIT: i64 = (days_from_civil(MAX_YEAR, 12, 31) + 1) * SECONDS_PER_DAY - 1;

/// A point on the physical time line with nanosecond resolution.
///
/// Ordering follows the UTC time line: a leap second sorts after every
/// fraction of the preceding 23:59:59.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UniversalInstant {
    posix: i64,
    nanos: u32,
    leap: bool,
}

impl UniversalInstant {
    /// 1970-01-01T00:00:00Z.
    pub const UNIX_EPOCH: Self = Self::raw(0, 0, false);

    /// Earliest supported instant.
    pub const MIN: Self = Self::raw(MIN_LIMIT, 0, false);

    /// Latest supported instant.
    pub const MAX: Self = Self::raw(MAX_LIMIT, (NANOS_PER_SECOND - 1) as u32, false);

    const fn raw(posix: i64, nanos: u32, leap: bool) -> Self {
        Self { posix, nanos, leap }
    }

    #[inline]
    pub(crate) const fn in_range(posix: i64) -> bool {
        posix >= MIN_LIMIT && posix <= MAX_LIMIT
    }

    /// Range-checked constructor from validated parts.
    pub(crate) fn checked(posix: i64, nanos: i64, leap: bool) -> InstantResult<Self> {
        if !Self::in_range(posix) {
            return Err(InstantError::OutOfRange(posix));
        }
        if !(0..NANOS_PER_SECOND).contains(&nanos) {
            return Err(InstantError::NanosecondOutOfRange(nanos));
        }
        Ok(Self::raw(posix, nanos as u32, leap))
    }

    // ── constructors ──────────────────────────────────────────────────

    /// Instant denoted by `elapsed` seconds and `nanosecond` on `scale`.
    ///
    /// ```rust
    /// use leapmoment::{TimeContext, TimeScale, UniversalInstant};
    ///
    /// let ctx = TimeContext::default();
    /// let leap = UniversalInstant::of(1_278_028_824, 210, TimeScale::Utc, &ctx).unwrap();
    /// assert!(leap.is_leap_second());
    /// assert_eq!(leap.to_string(), "2012-06-30T23:59:60,000000210Z");
    /// ```
    pub fn of(
        elapsed: i64,
        nanosecond: u32,
        scale: TimeScale,
        ctx: &TimeContext,
    ) -> InstantResult<Self> {
        if elapsed == 0 && nanosecond == 0 && scale == TimeScale::Posix {
            return Ok(Self::UNIX_EPOCH);
        }
        ScaleConverter::to_instant(elapsed, i64::from(nanosecond), scale, ctx)
    }

    /// Instant at `posix` seconds since 1970; needs no context.
    pub fn of_posix(posix: i64, nanosecond: u32) -> InstantResult<Self> {
        Self::checked(posix, i64::from(nanosecond), false)
    }

    // ── accessors ─────────────────────────────────────────────────────

    #[inline]
    pub const fn posix_seconds(&self) -> i64 {
        self.posix
    }

    /// Nanosecond fraction on the POSIX and UTC scales.
    #[inline]
    pub const fn nanosecond(&self) -> u32 {
        self.nanos
    }

    /// `true` for an inserted leap second (23:59:60).
    ///
    /// Reads the flag stored at construction and does not consult any
    /// context.  A context with suppressed leap seconds never sets the flag,
    /// but an instant built under an enabled context keeps it.  Queries that
    /// look up the registry, such as
    /// [`next_leap_second`](Self::next_leap_second), follow the context.
    #[inline]
    pub const fn is_leap_second(&self) -> bool {
        self.leap
    }

    /// `true` if the POSIX second was removed by a negative leap second.
    pub fn is_negative_leap_second(&self, ctx: &TimeContext) -> bool {
        let registry = ctx.leap_seconds();
        registry.supports_negative_leap()
            && registry.strip(registry.enhance(self.posix)) > self.posix
    }

    /// `(elapsed seconds, nanosecond)` on `scale`.
    pub fn project(&self, scale: TimeScale, ctx: &TimeContext) -> InstantResult<(i64, u32)> {
        ScaleConverter::project(self, scale, ctx)
    }

    /// Elapsed whole seconds on `scale`.
    pub fn elapsed_time(&self, scale: TimeScale, ctx: &TimeContext) -> InstantResult<i64> {
        self.project(scale, ctx).map(|(secs, _)| secs)
    }

    /// Nanosecond fraction on `scale`.
    pub fn nanosecond_in(&self, scale: TimeScale, ctx: &TimeContext) -> InstantResult<u32> {
        self.project(scale, ctx).map(|(_, nanos)| nanos)
    }

    /// Elapsed time on `scale` as an exact decimal string, e.g. `"-0.250000000"`.
    pub fn decimal_seconds(&self, scale: TimeScale, ctx: &TimeContext) -> InstantResult<String> {
        let (secs, nanos) = self.project(scale, ctx)?;
        Ok(if secs < 0 && nanos > 0 {
            let whole = -(i128::from(secs) + 1);
            let frac = NANOS_PER_SECOND as u32 - nanos;
            format!("-{whole}.{frac:09}")
        } else {
            format!("{secs}.{nanos:09}")
        })
    }

    // ── comparison ────────────────────────────────────────────────────

    #[inline]
    pub fn is_before(&self, other: &Self) -> bool {
        self < other
    }

    #[inline]
    pub fn is_after(&self, other: &Self) -> bool {
        self > other
    }

    #[inline]
    pub fn is_simultaneous(&self, other: &Self) -> bool {
        self == other
    }

    // ── SI arithmetic (UTC axis) ──────────────────────────────────────

    /// Adds real elapsed SI time.
    ///
    /// Both operand and result must lie on or after 1972-01-01.
    pub fn plus_si(&self, amount: i64, unit: SiUnit, ctx: &TimeContext) -> InstantResult<Self> {
        self.check_1972()?;
        if amount == 0 {
            return Ok(*self);
        }
        let axis = self.si_axis(ctx);
        let shifted = match unit {
            SiUnit::Seconds => axis
                .checked_add(amount)
                .ok_or_else(|| InstantError::overflow("plus"))
                .and_then(|secs| Self::from_si_axis(secs, i64::from(self.nanos), ctx)),
            SiUnit::Nanoseconds => {
                let sum = i64::from(self.nanos)
                    .checked_add(amount)
                    .ok_or_else(|| InstantError::overflow("plus"))?;
                axis.checked_add(sum.div_euclid(NANOS_PER_SECOND))
                    .ok_or_else(|| InstantError::overflow("plus"))
                    .and_then(|secs| {
                        Self::from_si_axis(secs, sum.rem_euclid(NANOS_PER_SECOND), ctx)
                    })
            }
        };
        let result = shifted.map_err(|err| match err.kind() {
            ErrorKind::DomainRange => InstantError::overflow("plus"),
            _ => err,
        })?;
        if amount < 0 {
            result.check_1972()?;
        }
        Ok(result)
    }

    /// Subtracts real elapsed SI time.
    pub fn minus_si(&self, amount: i64, unit: SiUnit, ctx: &TimeContext) -> InstantResult<Self> {
        let negated = amount
            .checked_neg()
            .ok_or_else(|| InstantError::overflow("minus"))?;
        self.plus_si(negated, unit, ctx)
    }

    /// Adds `seconds` and `nanos` of SI time.
    pub fn plus_duration(
        &self,
        seconds: i64,
        nanos: i64,
        ctx: &TimeContext,
    ) -> InstantResult<Self> {
        self.plus_si(seconds, SiUnit::Seconds, ctx)?
            .plus_si(nanos, SiUnit::Nanoseconds, ctx)
    }

    /// SI time from `self` to `end`, truncated toward zero.
    ///
    /// Inverse of [`plus_si`](Self::plus_si): `a.plus_si(a.until_si(b, u), u) == b`
    /// for whole multiples of `u`.
    pub fn until_si(&self, end: &Self, unit: SiUnit, ctx: &TimeContext) -> InstantResult<i64> {
        self.check_1972()?;
        end.check_1972()?;
        let delta_secs = i128::from(end.si_axis(ctx)) - i128::from(self.si_axis(ctx));
        let delta_nanos = i128::from(end.nanos) - i128::from(self.nanos);
        let total = match unit {
            SiUnit::Seconds => truncated_seconds(delta_secs, delta_nanos),
            SiUnit::Nanoseconds => delta_secs * i128::from(NANOS_PER_SECOND) + delta_nanos,
        };
        i64::try_from(total).map_err(|_| InstantError::overflow("until"))
    }

    // ── civil arithmetic (POSIX axis) ─────────────────────────────────

    /// Adds leap-second unaware time.  A leap second in the operand is lost.
    pub fn plus(&self, amount: i64, unit: TimeUnit) -> InstantResult<Self> {
        if amount == 0 {
            return Ok(*self);
        }
        let overflow = || InstantError::overflow("plus");
        let (posix, nanos) = match (unit.seconds(), unit.nanos()) {
            (Some(factor), _) => {
                let delta = amount.checked_mul(factor).ok_or_else(overflow)?;
                (self.posix.checked_add(delta).ok_or_else(overflow)?, i64::from(self.nanos))
            }
            (_, Some(factor)) => {
                let sum = i128::from(amount) * i128::from(factor) + i128::from(self.nanos);
                let nano_unit = i128::from(NANOS_PER_SECOND);
                let secs = i64::try_from(sum.div_euclid(nano_unit)).map_err(|_| overflow())?;
                (
                    self.posix.checked_add(secs).ok_or_else(overflow)?,
                    sum.rem_euclid(nano_unit) as i64,
                )
            }
            _ => return Err(overflow()),
        };
        Self::checked(posix, nanos, false).map_err(|_| overflow())
    }

    /// Subtracts leap-second unaware time.
    pub fn minus(&self, amount: i64, unit: TimeUnit) -> InstantResult<Self> {
        let negated = amount
            .checked_neg()
            .ok_or_else(|| InstantError::overflow("minus"))?;
        self.plus(negated, unit)
    }

    /// Leap-second unaware time from `self` to `end`, truncated toward zero.
    pub fn until(&self, end: &Self, unit: TimeUnit) -> InstantResult<i64> {
        let delta_secs = i128::from(end.posix) - i128::from(self.posix);
        let delta_nanos = i128::from(end.nanos) - i128::from(self.nanos);
        let total = match (unit.seconds(), unit.nanos()) {
            (Some(factor), _) => truncated_seconds(delta_secs, delta_nanos) / i128::from(factor),
            (_, Some(factor)) => {
                (delta_secs * i128::from(NANOS_PER_SECOND) + delta_nanos) / i128::from(factor)
            }
            _ => return Err(InstantError::overflow("until")),
        };
        i64::try_from(total).map_err(|_| InstantError::overflow("until"))
    }

    // ── leap lookahead ────────────────────────────────────────────────

    /// Next registered leap second strictly after this instant.
    ///
    /// `None` when leap seconds are suppressed or the table is exhausted.
    pub fn next_leap_second(&self, ctx: &TimeContext) -> Option<Self> {
        let registry = ctx.leap_seconds();
        if !registry.is_enabled() {
            return None;
        }
        let event = registry.next_event(utc_elapsed(self, ctx))?;
        let day = ctx.calendar().posix_day_from_date(event.date);
        let last_second = Self::of_posix((day + 1) * SECONDS_PER_DAY - 1, 0).ok()?;
        last_second
            .plus_si(i64::from(event.shift), SiUnit::Seconds, ctx)
            .ok()
    }

    // ── element edits ─────────────────────────────────────────────────

    /// Replaces the nanosecond fraction; a leap second stays a leap second.
    pub fn with_nanosecond(&self, nanosecond: u32, ctx: &TimeContext) -> InstantResult<Self> {
        let nanos = i64::from(nanosecond);
        if ctx.leap_seconds().is_enabled() {
            ScaleConverter::from_utc_elapsed(utc_elapsed(self, ctx), nanos, ctx)
        } else {
            Self::checked(self.posix, nanos, false)
        }
    }

    /// Truncates to `unit`.
    ///
    /// Units of a second or finer keep a leap second; coarser units drop it.
    pub fn truncated_to(&self, unit: TimeUnit, ctx: &TimeContext) -> InstantResult<Self> {
        match unit {
            TimeUnit::Days | TimeUnit::Hours | TimeUnit::Minutes => {
                let step = unit.seconds().unwrap_or(1);
                Self::checked(self.posix.div_euclid(step) * step, 0, false)
            }
            TimeUnit::Nanoseconds => Ok(*self),
            TimeUnit::Seconds | TimeUnit::Milliseconds | TimeUnit::Microseconds => {
                let step = unit.nanos().unwrap_or(NANOS_PER_SECOND);
                let nanos = i64::from(self.nanos) / step * step;
                let truncated = Self::checked(self.posix, nanos, false)?;
                if self.leap {
                    truncated.plus_si(1, SiUnit::Seconds, ctx)
                } else {
                    Ok(truncated)
                }
            }
        }
    }

    /// Coarsest unit at which this instant is exact.
    pub fn precision(&self) -> TimeUnit {
        if self.nanos == 0 {
            if self.leap || self.posix % 60 != 0 {
                TimeUnit::Seconds
            } else if self.posix % 3_600 != 0 {
                TimeUnit::Minutes
            } else if self.posix % SECONDS_PER_DAY != 0 {
                TimeUnit::Hours
            } else {
                TimeUnit::Days
            }
        } else if self.nanos % 1_000_000 == 0 {
            TimeUnit::Milliseconds
        } else if self.nanos % 1_000 == 0 {
            TimeUnit::Microseconds
        } else {
            TimeUnit::Nanoseconds
        }
    }

    // ── rendering ─────────────────────────────────────────────────────

    /// Scale-tagged form, e.g. `TAI-2012-07-01T00:00:34Z`.
    ///
    /// Continuous scales are printed as if their counter were a POSIX clock
    /// started at their epoch; only the UTC form shows second 60.
    pub fn to_string_in(&self, scale: TimeScale, ctx: &TimeContext) -> InstantResult<String> {
        let overflow = || InstantError::overflow("to_string_in");
        let (posix, nanos, leap) = match scale {
            TimeScale::Posix => (self.posix, self.nanos, false),
            TimeScale::Utc => (self.posix, self.nanos, self.leap),
            TimeScale::Tai => {
                let (secs, nanos) = self.project(scale, ctx)?;
                let posix = secs
                    .checked_add(POSIX_UTC_DELTA - UTC_TAI_DELTA)
                    .ok_or_else(overflow)?;
                (posix, nanos, false)
            }
            TimeScale::Tt | TimeScale::Ut => {
                let (secs, nanos) = self.project(scale, ctx)?;
                (secs.checked_add(POSIX_UTC_DELTA).ok_or_else(overflow)?, nanos, false)
            }
            TimeScale::Gps => {
                let (secs, nanos) = self.project(scale, ctx)?;
                (secs.checked_add(POSIX_GPS_DELTA).ok_or_else(overflow)?, nanos, false)
            }
        };
        let mut out = format!("{}-", scale.label());
        write_timestamp(&mut out, posix, nanos, leap).map_err(|_| overflow())?;
        Ok(out)
    }

    // ── chrono interop ────────────────────────────────────────────────

    /// Converts to `chrono`, mapping a leap second onto chrono's
    /// nanosecond ≥ 1e9 form.  `None` outside chrono's range.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        let nanos = if self.leap {
            self.nanos + NANOS_PER_SECOND as u32
        } else {
            self.nanos
        };
        DateTime::<Utc>::from_timestamp(self.posix, nanos)
    }

    /// Builds an instant from `chrono`.  A chrono leap second must be
    /// registered in `ctx`.
    pub fn from_utc(datetime: DateTime<Utc>, ctx: &TimeContext) -> InstantResult<Self> {
        let posix = datetime.timestamp();
        let nanos = datetime.timestamp_subsec_nanos();
        if nanos < NANOS_PER_SECOND as u32 {
            return Self::of_posix(posix, nanos);
        }
        Self::of_posix(posix, nanos - NANOS_PER_SECOND as u32)?.with_leap_flag(ctx)
    }

    // ── internals ─────────────────────────────────────────────────────

    /// Marks this POSIX second as the leap second following it, if the
    /// registry of `ctx` knows one.
    pub(crate) fn with_leap_flag(self, ctx: &TimeContext) -> InstantResult<Self> {
        let registry = ctx.leap_seconds();
        if registry.is_enabled() && registry.is_positive_leap(registry.enhance(self.posix) + 1) {
            Ok(Self::raw(self.posix, self.nanos, true))
        } else {
            Err(InstantError::UnregisteredLeapSecond {
                date: ctx.date_of(self.posix),
            })
        }
    }

    fn check_1972(&self) -> InstantResult<()> {
        if self.posix < POSIX_UTC_DELTA {
            Err(InstantError::Before1972)
        } else {
            Ok(())
        }
    }

    /// Counter used by SI arithmetic: UTC when leap seconds are on, POSIX otherwise.
    fn si_axis(&self, ctx: &TimeContext) -> i64 {
        if ctx.leap_seconds().is_enabled() {
            utc_elapsed(self, ctx)
        } else {
            self.posix
        }
    }

    fn from_si_axis(value: i64, nanos: i64, ctx: &TimeContext) -> InstantResult<Self> {
        if ctx.leap_seconds().is_enabled() {
            ScaleConverter::from_utc_elapsed(value, nanos, ctx)
        } else {
            Self::checked(value, nanos, false)
        }
    }
}

/// Whole seconds of `secs + nanos·1e-9`, truncated toward zero.
fn truncated_seconds(secs: i128, nanos: i128) -> i128 {
    if secs < 0 && nanos > 0 {
        secs + 1
    } else if secs > 0 && nanos < 0 {
        secs - 1
    } else {
        secs
    }
}

fn write_timestamp(out: &mut impl fmt::Write, posix: i64, nanos: u32, leap: bool) -> fmt::Result {
    let date = CivilDate::from_posix_day(posix.div_euclid(SECONDS_PER_DAY));
    let time_of_day = posix.rem_euclid(SECONDS_PER_DAY);
    let second = time_of_day % 60 + i64::from(leap);
    write!(
        out,
        "{date}T{:02}:{:02}:{:02}",
        time_of_day / 3_600,
        time_of_day / 60 % 60,
        second
    )?;
    if nanos > 0 {
        write!(out, ",{nanos:09}")?;
    }
    out.write_char('Z')
}

// ═══════════════════════════════════════════════════════════════════════════
// Trait implementations
// ═══════════════════════════════════════════════════════════════════════════

impl Ord for UniversalInstant {
    fn cmp(&self, other: &Self) -> Ordering {
        self.posix
            .cmp(&other.posix)
            .then(self.leap.cmp(&other.leap))
            .then(self.nanos.cmp(&other.nanos))
    }
}

impl PartialOrd for UniversalInstant {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Canonical UTC form, e.g. `2012-06-30T23:59:60,000000210Z`.
impl fmt::Display for UniversalInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_timestamp(f, self.posix, self.nanos, self.leap)
    }
}

impl Default for UniversalInstant {
    fn default() -> Self {
        Self::UNIX_EPOCH
    }
}

// ── Serde ─────────────────────────────────────────────────────────────────

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct RawInstant {
    posix: i64,
    nanos: u32,
    #[serde(default)]
    leap: bool,
}

#[cfg(feature = "serde")]
impl Serialize for UniversalInstant {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        RawInstant {
            posix: self.posix,
            nanos: self.nanos,
            leap: self.leap,
        }
        .serialize(serializer)
    }
}

/// A set leap flag is checked against [`TimeContext::global`].
#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for UniversalInstant {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawInstant::deserialize(deserializer)?;
        let plain = Self::of_posix(raw.posix, raw.nanos).map_err(D::Error::custom)?;
        if raw.leap {
            plain
                .with_leap_flag(TimeContext::global())
                .map_err(D::Error::custom)
        } else {
            Ok(plain)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leap::LeapSecondTable;

    /// UTC seconds of 2012-06-30T23:59:60Z.
    const UTC_LEAP_2012: i64 = 1_278_028_824;
    /// POSIX seconds of 2012-06-30T23:59:59Z.
    const POSIX_2012_LAST: i64 = 1_341_100_799;

    fn ctx() -> TimeContext {
        TimeContext::default()
    }

    fn leap_2012(ctx: &TimeContext) -> UniversalInstant {
        UniversalInstant::of(UTC_LEAP_2012, 0, TimeScale::Utc, ctx).unwrap()
    }

    #[test]
    fn known_leap_second() {
        let ctx = ctx();
        let m = UniversalInstant::of(UTC_LEAP_2012, 210, TimeScale::Utc, &ctx).unwrap();
        assert!(m.is_leap_second());
        assert_eq!(m.posix_seconds(), POSIX_2012_LAST);
        assert_eq!(m.to_string(), "2012-06-30T23:59:60,000000210Z");

        let before = m.minus_si(1, SiUnit::Seconds, &ctx).unwrap();
        assert!(!before.is_leap_second());
        assert_eq!(before.to_string(), "2012-06-30T23:59:59,000000210Z");
        assert!(before < m);
    }

    #[test]
    fn epoch_renderings() {
        let ctx = ctx();
        let render = |scale| UniversalInstant::of(0, 0, scale, &ctx).unwrap().to_string();
        assert_eq!(render(TimeScale::Posix), "1970-01-01T00:00:00Z");
        assert_eq!(render(TimeScale::Utc), "1972-01-01T00:00:00Z");
        assert_eq!(render(TimeScale::Gps), "1980-01-06T00:00:00Z");
    }

    #[test]
    fn extremes() {
        assert_eq!(UniversalInstant::MIN.to_string(), "-999999999-01-01T00:00:00Z");
        assert_eq!(
            UniversalInstant::MAX.to_string(),
            "+999999999-12-31T23:59:59,999999999Z"
        );
        assert!(UniversalInstant::of_posix(MAX_LIMIT + 1, 0).is_err());
        assert!(matches!(
            UniversalInstant::of_posix(MIN_LIMIT - 1, 0),
            Err(InstantError::OutOfRange(_))
        ));
    }

    #[test]
    fn leap_flag_participates_in_equality_and_order() {
        let ctx = ctx();
        let leap = leap_2012(&ctx);
        let plain = UniversalInstant::of_posix(POSIX_2012_LAST, 0).unwrap();
        let late = UniversalInstant::of_posix(POSIX_2012_LAST, 999_999_999).unwrap();
        let next = UniversalInstant::of_posix(POSIX_2012_LAST + 1, 0).unwrap();
        assert_ne!(leap, plain);
        assert!(plain < late && late < leap && leap < next);
        assert!(leap.is_after(&late) && leap.is_before(&next));
        assert!(leap.is_simultaneous(&leap_2012(&ctx)));
    }

    #[test]
    fn si_arithmetic_counts_leap_second() {
        let ctx = ctx();
        let before = UniversalInstant::of_posix(POSIX_2012_LAST, 0).unwrap();
        let after = UniversalInstant::of_posix(POSIX_2012_LAST + 1, 0).unwrap();
        assert_eq!(before.until_si(&after, SiUnit::Seconds, &ctx).unwrap(), 2);
        assert_eq!(before.until(&after, TimeUnit::Seconds).unwrap(), 1);
        assert_eq!(before.plus_si(1, SiUnit::Seconds, &ctx).unwrap(), leap_2012(&ctx));
        assert_eq!(before.plus_si(2, SiUnit::Seconds, &ctx).unwrap(), after);
        assert_eq!(
            after.until_si(&before, SiUnit::Nanoseconds, &ctx).unwrap(),
            -2_000_000_000
        );
    }

    #[test]
    fn nanosecond_steps_cross_leap_second() {
        let ctx = ctx();
        let late = UniversalInstant::of_posix(POSIX_2012_LAST, 999_999_999).unwrap();
        let leap = late.plus_si(1, SiUnit::Nanoseconds, &ctx).unwrap();
        assert!(leap.is_leap_second());
        assert_eq!(leap.nanosecond(), 0);
        assert_eq!(leap.minus_si(1, SiUnit::Nanoseconds, &ctx).unwrap(), late);
    }

    #[test]
    fn si_arithmetic_rejects_pre_1972() {
        let ctx = ctx();
        let m = UniversalInstant::of_posix(POSIX_UTC_DELTA - 1, 0).unwrap();
        assert!(matches!(
            m.plus_si(5, SiUnit::Seconds, &ctx),
            Err(InstantError::Before1972)
        ));
        let epoch = UniversalInstant::of(0, 0, TimeScale::Utc, &ctx).unwrap();
        assert!(matches!(
            epoch.minus_si(1, SiUnit::Seconds, &ctx),
            Err(InstantError::Before1972)
        ));
        assert!(matches!(
            epoch.plus_si(i64::MAX, SiUnit::Seconds, &ctx),
            Err(InstantError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn civil_arithmetic_drops_leap_flag() {
        let ctx = ctx();
        let leap = leap_2012(&ctx);
        let next_day = leap.plus(1, TimeUnit::Days).unwrap();
        assert!(!next_day.is_leap_second());
        assert_eq!(next_day.to_string(), "2012-07-01T23:59:59Z");
        let m = UniversalInstant::UNIX_EPOCH.minus(1_500, TimeUnit::Milliseconds).unwrap();
        assert_eq!((m.posix_seconds(), m.nanosecond()), (-2, 500_000_000));
        assert_eq!(m.until(&UniversalInstant::UNIX_EPOCH, TimeUnit::Seconds).unwrap(), 1);
        assert_eq!(
            m.until(&UniversalInstant::UNIX_EPOCH, TimeUnit::Microseconds).unwrap(),
            1_500_000
        );
        assert!(UniversalInstant::MAX.plus(1, TimeUnit::Days).is_err());
    }

    #[test]
    fn next_leap_second_lookahead() {
        let ctx = ctx();
        let m = UniversalInstant::of_posix(1_300_000_000, 0).unwrap();
        let next = m.next_leap_second(&ctx).unwrap();
        assert_eq!(next, leap_2012(&ctx));
        let following = next.next_leap_second(&ctx).unwrap();
        assert_eq!(following.to_string(), "2015-06-30T23:59:60Z");

        let m2017 = UniversalInstant::of_posix(1_500_000_000, 0).unwrap();
        assert!(m2017.next_leap_second(&ctx).is_none());

        let off = TimeContext::default().with_leap_seconds(LeapSecondTable::iers().suppressed());
        assert!(m.next_leap_second(&off).is_none());
    }

    #[test]
    fn leap_flag_is_intrinsic_to_the_instant() {
        let ctx = ctx();
        let leap = leap_2012(&ctx);
        let off = TimeContext::default().with_leap_seconds(LeapSecondTable::iers().suppressed());
        assert!(leap.is_leap_second());
        assert!(leap.next_leap_second(&off).is_none());
        // The suppressed context cannot produce the flag itself.
        assert!(leap.with_leap_flag(&off).is_err());
        let plain = UniversalInstant::of_posix(leap.posix_seconds(), 0).unwrap();
        assert!(!plain.is_leap_second());
    }

    #[test]
    fn nanosecond_edit_keeps_leap_second() {
        let ctx = ctx();
        let leap = leap_2012(&ctx);
        let edited = leap.with_nanosecond(123, &ctx).unwrap();
        assert!(edited.is_leap_second());
        assert_eq!(edited.nanosecond(), 123);
    }

    #[test]
    fn truncation_and_precision() {
        let ctx = ctx();
        let leap = leap_2012(&ctx).with_nanosecond(123_456_789, &ctx).unwrap();
        let millis = leap.truncated_to(TimeUnit::Milliseconds, &ctx).unwrap();
        assert!(millis.is_leap_second());
        assert_eq!(millis.nanosecond(), 123_000_000);
        assert_eq!(millis.precision(), TimeUnit::Milliseconds);

        let day = leap.truncated_to(TimeUnit::Days, &ctx).unwrap();
        assert_eq!(day.to_string(), "2012-06-30T00:00:00Z");
        assert_eq!(day.precision(), TimeUnit::Days);
        assert_eq!(leap.precision(), TimeUnit::Nanoseconds);
        assert_eq!(leap_2012(&ctx).precision(), TimeUnit::Seconds);
    }

    #[test]
    fn scale_tagged_rendering() {
        let ctx = ctx();
        let leap = leap_2012(&ctx);
        assert_eq!(leap.to_string_in(TimeScale::Utc, &ctx).unwrap(), "UTC-2012-06-30T23:59:60Z");
        assert_eq!(
            leap.to_string_in(TimeScale::Posix, &ctx).unwrap(),
            "POSIX-2012-06-30T23:59:59Z"
        );
        // TAI − UTC is 34 s until the leap second ends.
        assert_eq!(leap.to_string_in(TimeScale::Tai, &ctx).unwrap(), "TAI-2012-07-01T00:00:34Z");
        assert_eq!(leap.to_string_in(TimeScale::Gps, &ctx).unwrap(), "GPS-2012-07-01T00:00:15Z");
    }

    #[test]
    fn decimal_seconds_form() {
        let ctx = ctx();
        let m = UniversalInstant::of_posix(-1, 750_000_000).unwrap();
        assert_eq!(m.decimal_seconds(TimeScale::Posix, &ctx).unwrap(), "-0.250000000");
        let m = UniversalInstant::of_posix(12, 5).unwrap();
        assert_eq!(m.decimal_seconds(TimeScale::Posix, &ctx).unwrap(), "12.000000005");
    }

    #[test]
    fn chrono_interop() {
        let ctx = ctx();
        let leap = leap_2012(&ctx);
        let dt = leap.to_utc().unwrap();
        assert_eq!(dt.timestamp(), POSIX_2012_LAST);
        assert_eq!(dt.timestamp_subsec_nanos(), 1_000_000_000);
        assert_eq!(UniversalInstant::from_utc(dt, &ctx).unwrap(), leap);

        // 2013-06-30 had no leap second.
        let bogus = DateTime::<Utc>::from_timestamp(1_372_636_799, 1_000_000_000).unwrap();
        assert!(matches!(
            UniversalInstant::from_utc(bogus, &ctx),
            Err(InstantError::UnregisteredLeapSecond { .. })
        ));
        assert!(UniversalInstant::MIN.to_utc().is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip() {
        let m = UniversalInstant::of_posix(1_000, 42).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"posix":1000,"nanos":42,"leap":false}"#);
        let back: UniversalInstant = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
        let bad = r#"{"posix":0,"nanos":2000000000}"#;
        assert!(serde_json::from_str::<UniversalInstant>(bad).is_err());
    }
}
