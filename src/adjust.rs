// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! Zoned field adjustment of instants.
//!
//! An [`Adjustment`] pairs a [`Field`] with an [`Operation`] and applies it to
//! the wall-clock view of an instant in a zone.  Local timestamps know
//! nothing about leap seconds, so the engine adds these rules on top:
//!
//! * Setting the second of minute to 60 moves onto the registered leap second
//!   of the current UTC minute, or fails.
//! * Increment, decrement and lenient set of sub-minute fields become SI
//!   deltas, so a leap second is never skipped.
//! * Ceiling or maximize that lands on 23:59:59 of a leap day moves on to
//!   23:59:60.
//! * Edits of coarser fields and of the fraction keep a leap second.
//! * A leap second under an offset that is not whole minutes is ambiguous.
//!
//! ```rust
//! use leapmoment::{Adjustment, Field, FixedZone, Operation, TimeContext, UniversalInstant};
//!
//! let ctx = TimeContext::default();
//! // 2012-06-30T23:59:59Z
//! let m = UniversalInstant::of_posix(1_341_100_799, 0).unwrap();
//! let leap = Adjustment::new(Field::SecondOfMinute, Operation::Set(60))
//!     .apply(&m, &FixedZone::UTC, &ctx)
//!     .unwrap();
//! assert_eq!(leap.to_string(), "2012-06-30T23:59:60Z");
//! ```

use crate::calendar::{days_from_civil, is_leap_year, length_of_month, MAX_YEAR, MIN_YEAR};
use crate::context::TimeContext;
use crate::error::{InstantError, InstantResult};
use crate::instant::UniversalInstant;
use crate::scales::{NANOS_PER_SECOND, POSIX_UTC_DELTA, SECONDS_PER_DAY};
use crate::units::SiUnit;
use crate::zone::{LocalDateTime, ZoneOffset, ZoneRules};

const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: i64 = 3_600 * NANOS_PER_SECOND;
const NANOS_PER_DAY: i64 = SECONDS_PER_DAY * NANOS_PER_SECOND;

/// Below this instant the leap-second specific paths are skipped.
const LEAP_CHECK_START: i64 = POSIX_UTC_DELTA + SECONDS_PER_DAY;

/// Adjustable fields of the zone-local timestamp.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Year,
    Month,
    DayOfMonth,
    DayOfYear,
    HourOfDay,
    MinuteOfHour,
    MinuteOfDay,
    SecondOfMinute,
    SecondOfDay,
    MilliOfSecond,
    MicroOfSecond,
    NanoOfSecond,
    MilliOfDay,
    MicroOfDay,
    NanoOfDay,
}

/// What to do with a field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Replace the value; out-of-range values fail.
    Set(i64),
    /// Replace the value, carrying overflow into coarser fields.
    SetLenient(i64),
    Increment,
    Decrement,
    /// Smallest valid value in context.
    Minimize,
    /// Largest valid value in context.
    Maximize,
    /// Start of the field: every finer field at its minimum.
    Floor,
    /// End of the field: every finer field at its maximum.
    Ceiling,
}

impl Field {
    #[inline]
    fn is_date(self) -> bool {
        matches!(
            self,
            Field::Year | Field::Month | Field::DayOfMonth | Field::DayOfYear
        )
    }

    #[inline]
    fn is_high_time(self) -> bool {
        matches!(
            self,
            Field::HourOfDay | Field::MinuteOfHour | Field::MinuteOfDay
        )
    }

    /// Steps per second for the fine fields edited as SI deltas.
    fn steps_per_second(self) -> Option<i64> {
        match self {
            Field::SecondOfMinute | Field::SecondOfDay => Some(1),
            Field::MilliOfSecond | Field::MilliOfDay => Some(1_000),
            Field::MicroOfSecond | Field::MicroOfDay => Some(1_000_000),
            Field::NanoOfSecond | Field::NanoOfDay => Some(NANOS_PER_SECOND),
            _ => None,
        }
    }

    /// Length of one unit of a time field in nanoseconds.
    fn unit_nanos(self) -> Option<i64> {
        match self {
            Field::HourOfDay => Some(NANOS_PER_HOUR),
            Field::MinuteOfHour | Field::MinuteOfDay => Some(NANOS_PER_MINUTE),
            other => other.steps_per_second().map(|steps| NANOS_PER_SECOND / steps),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Field::Year => "year",
            Field::Month => "month",
            Field::DayOfMonth => "day of month",
            Field::DayOfYear => "day of year",
            Field::HourOfDay => "hour of day",
            Field::MinuteOfHour => "minute of hour",
            Field::MinuteOfDay => "minute of day",
            Field::SecondOfMinute => "second of minute",
            Field::SecondOfDay => "second of day",
            Field::MilliOfSecond => "milli of second",
            Field::MicroOfSecond => "micro of second",
            Field::NanoOfSecond => "nano of second",
            Field::MilliOfDay => "milli of day",
            Field::MicroOfDay => "micro of day",
            Field::NanoOfDay => "nano of day",
        }
    }

    /// Current value of the field in `local`.
    pub fn value_in(self, local: &LocalDateTime) -> i64 {
        let date = local.date();
        let nod = local.nano_of_day();
        match self {
            Field::Year => date.year(),
            Field::Month => i64::from(date.month()),
            Field::DayOfMonth => i64::from(date.day()),
            Field::DayOfYear => local.posix_day() - days_from_civil(date.year(), 1, 1) + 1,
            Field::HourOfDay => nod / NANOS_PER_HOUR,
            Field::MinuteOfHour => nod / NANOS_PER_MINUTE % 60,
            Field::MinuteOfDay => nod / NANOS_PER_MINUTE,
            Field::SecondOfMinute => nod / NANOS_PER_SECOND % 60,
            Field::SecondOfDay => nod / NANOS_PER_SECOND,
            Field::MilliOfSecond => nod % NANOS_PER_SECOND / 1_000_000,
            Field::MicroOfSecond => nod % NANOS_PER_SECOND / 1_000,
            Field::NanoOfSecond => nod % NANOS_PER_SECOND,
            Field::MilliOfDay => nod / 1_000_000,
            Field::MicroOfDay => nod / 1_000,
            Field::NanoOfDay => nod,
        }
    }

    /// Valid range of the field in the context of `local`.
    pub fn range_in(self, local: &LocalDateTime) -> (i64, i64) {
        let date = local.date();
        let max = match self {
            Field::Year => return (MIN_YEAR, MAX_YEAR),
            Field::Month => 12,
            Field::DayOfMonth => i64::from(length_of_month(date.year(), date.month())),
            Field::DayOfYear => {
                if is_leap_year(date.year()) {
                    366
                } else {
                    365
                }
            }
            Field::HourOfDay => 23,
            Field::MinuteOfHour | Field::SecondOfMinute => 59,
            Field::MinuteOfDay => 1_439,
            Field::SecondOfDay => SECONDS_PER_DAY - 1,
            Field::MilliOfSecond => 999,
            Field::MicroOfSecond => 999_999,
            Field::NanoOfSecond => NANOS_PER_SECOND - 1,
            Field::MilliOfDay => SECONDS_PER_DAY * 1_000 - 1,
            Field::MicroOfDay => SECONDS_PER_DAY * 1_000_000 - 1,
            Field::NanoOfDay => NANOS_PER_DAY - 1,
        };
        let min = if self.is_date() { 1 } else { 0 };
        (min, max)
    }
}

/// A field edit of an instant in a zone.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Adjustment {
    pub field: Field,
    pub operation: Operation,
}

impl Adjustment {
    pub const fn new(field: Field, operation: Operation) -> Self {
        Self { field, operation }
    }

    /// Applies the edit to `moment` as seen in `zone`.
    pub fn apply(
        &self,
        moment: &UniversalInstant,
        zone: &dyn ZoneRules,
        ctx: &TimeContext,
    ) -> InstantResult<UniversalInstant> {
        let offset = zone.offset_at(moment);
        if moment.is_leap_second() && !offset.is_whole_minutes() {
            return Err(InstantError::AmbiguousLeapAdjustment { offset });
        }

        let leap_era = *moment > UniversalInstant::of_posix(LEAP_CHECK_START, 0)?;
        if leap_era {
            if let Some(result) = self.apply_si(moment, zone, ctx)? {
                return Ok(result);
            }
        }

        let local = LocalDateTime::of_instant(moment, offset);
        let edited = edit_local(self.field, self.operation, &local)?;
        let result = edited.at_offset(zone.offset_for_local(&edited))?;

        if self.operation == Operation::Floor {
            return Ok(result);
        }

        if result.is_negative_leap_second(ctx) {
            return if zone.is_strict() {
                Err(InstantError::NegativeLeapSecond(edited.to_string()))
            } else {
                Ok(result)
            };
        }

        let field = self.field;
        let op = self.operation;
        if field.is_date() || field.is_high_time() {
            if moment.is_leap_second() || op == Operation::Ceiling {
                return move_to_leap_second(result, ctx);
            }
        } else if field == Field::SecondOfMinute {
            if matches!(op, Operation::Maximize | Operation::Ceiling) {
                return move_to_leap_second(result, ctx);
            }
        } else if matches!(
            field,
            Field::MilliOfSecond | Field::MicroOfSecond | Field::NanoOfSecond
        ) && matches!(
            op,
            Operation::Set(_) | Operation::Minimize | Operation::Maximize | Operation::Ceiling
        ) && moment.is_leap_second()
        {
            return result.plus_si(1, SiUnit::Seconds, ctx);
        }

        Ok(result)
    }

    /// Leap-second aware paths on the UTC axis; `None` falls back to the
    /// local edit.
    fn apply_si(
        &self,
        moment: &UniversalInstant,
        zone: &dyn ZoneRules,
        ctx: &TimeContext,
    ) -> InstantResult<Option<UniversalInstant>> {
        let utc_time = LocalDateTime::of_instant(moment, ZoneOffset::UTC);

        if self.field == Field::SecondOfMinute && self.operation == Operation::Set(60) {
            if moment.is_leap_second() {
                return Ok(Some(*moment));
            }
            let offset = zone.offset_at(moment);
            if !offset.is_whole_minutes() {
                return Err(InstantError::AmbiguousLeapAdjustment { offset });
            }
            if max_second_of_minute(moment, ctx) == 60 {
                let old = Field::SecondOfMinute.value_in(&utc_time);
                return moment.plus_si(60 - old, SiUnit::Seconds, ctx).map(Some);
            }
            return Err(InstantError::LeapSecondInvalidInContext(moment.to_string()));
        }

        let Some(steps) = self.field.steps_per_second() else {
            return Ok(None);
        };
        let amount = match self.operation {
            Operation::Increment => 1,
            Operation::Decrement => -1,
            Operation::SetLenient(value) => value
                .checked_sub(self.field.value_in(&utc_time))
                .ok_or_else(|| InstantError::overflow("adjust"))?,
            _ => return Ok(None),
        };
        let result = if steps == 1 {
            moment.plus_si(amount, SiUnit::Seconds, ctx)?
        } else {
            let nanos = amount
                .checked_mul(NANOS_PER_SECOND / steps)
                .ok_or_else(|| InstantError::overflow("adjust"))?;
            moment.plus_si(nanos, SiUnit::Nanoseconds, ctx)?
        };
        Ok(Some(result))
    }
}

/// 60 on the last UTC minute of a day ending with a positive leap second.
fn max_second_of_minute(moment: &UniversalInstant, ctx: &TimeContext) -> i64 {
    let posix = moment.posix_seconds();
    let last_minute = posix.rem_euclid(SECONDS_PER_DAY) / 60 == 1_439;
    if last_minute && ctx.leap_seconds().shift_at(ctx.date_of(posix)) == 1 {
        60
    } else {
        59
    }
}

/// Advances 23:59:59 UTC of a leap day onto the leap second.
fn move_to_leap_second(
    adjusted: UniversalInstant,
    ctx: &TimeContext,
) -> InstantResult<UniversalInstant> {
    let posix = adjusted.posix_seconds();
    let last_second = posix.rem_euclid(SECONDS_PER_DAY) == SECONDS_PER_DAY - 1;
    if last_second && ctx.leap_seconds().shift_at(ctx.date_of(posix)) == 1 {
        adjusted.plus_si(1, SiUnit::Seconds, ctx)
    } else {
        Ok(adjusted)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Local edits
// ═══════════════════════════════════════════════════════════════════════════

fn edit_local(field: Field, op: Operation, local: &LocalDateTime) -> InstantResult<LocalDateTime> {
    let (min, max) = field.range_in(local);
    let current = field.value_in(local);
    match op {
        Operation::Set(value) => {
            if value < min || value > max {
                return Err(InstantError::InvalidFieldValue {
                    field: field.name(),
                    value,
                });
            }
            add_lenient(field, local, value - current)
        }
        Operation::SetLenient(value) => {
            let delta = value
                .checked_sub(current)
                .ok_or_else(|| InstantError::overflow("adjust"))?;
            add_lenient(field, local, delta)
        }
        Operation::Increment => add_lenient(field, local, 1),
        Operation::Decrement => add_lenient(field, local, -1),
        Operation::Minimize => add_lenient(field, local, min - current),
        Operation::Maximize => add_lenient(field, local, max - current),
        Operation::Floor => Ok(floor(field, local)),
        Operation::Ceiling => Ok(ceiling(field, local)),
    }
}

/// Adds `amount` units of `field`, carrying into coarser fields.
fn add_lenient(field: Field, local: &LocalDateTime, amount: i64) -> InstantResult<LocalDateTime> {
    let overflow = || InstantError::overflow("adjust");
    let date = local.date();
    match field {
        Field::Year => {
            let year = date.year().checked_add(amount).ok_or_else(overflow)?;
            with_date(local, year, date.month(), date.day())
        }
        Field::Month => {
            let months = (date.year() * 12 + i64::from(date.month()) - 1)
                .checked_add(amount)
                .ok_or_else(overflow)?;
            with_date(local, months.div_euclid(12), (months.rem_euclid(12) + 1) as u8, date.day())
        }
        Field::DayOfMonth | Field::DayOfYear => {
            let day = local.posix_day().checked_add(amount).ok_or_else(overflow)?;
            checked_local(day, local.nano_of_day())
        }
        time_field => {
            let unit = time_field.unit_nanos().unwrap_or(1);
            let total = i128::from(local.posix_day()) * i128::from(NANOS_PER_DAY)
                + i128::from(local.nano_of_day())
                + i128::from(amount) * i128::from(unit);
            let day = i64::try_from(total.div_euclid(i128::from(NANOS_PER_DAY)))
                .map_err(|_| overflow())?;
            checked_local(day, total.rem_euclid(i128::from(NANOS_PER_DAY)) as i64)
        }
    }
}

/// Same time of day on another date; the day is clamped to the month length.
fn with_date(local: &LocalDateTime, year: i64, month: u8, day: u8) -> InstantResult<LocalDateTime> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(InstantError::InvalidFieldValue {
            field: Field::Year.name(),
            value: year,
        });
    }
    let day = day.min(length_of_month(year, month));
    Ok(LocalDateTime::from_parts(
        days_from_civil(year, month, day),
        local.nano_of_day(),
    ))
}

fn checked_local(day: i64, nano_of_day: i64) -> InstantResult<LocalDateTime> {
    let first = days_from_civil(MIN_YEAR, 1, 1);
    let last = days_from_civil(MAX_YEAR, 12, 31);
    if day < first || day > last {
        return Err(InstantError::OutOfRange(day.saturating_mul(SECONDS_PER_DAY)));
    }
    Ok(LocalDateTime::from_parts(day, nano_of_day))
}

fn floor(field: Field, local: &LocalDateTime) -> LocalDateTime {
    let date = local.date();
    match field {
        Field::Year => LocalDateTime::from_parts(days_from_civil(date.year(), 1, 1), 0),
        Field::Month => LocalDateTime::from_parts(days_from_civil(date.year(), date.month(), 1), 0),
        Field::DayOfMonth | Field::DayOfYear => LocalDateTime::from_parts(local.posix_day(), 0),
        time_field => {
            let unit = time_field.unit_nanos().unwrap_or(1);
            let nod = local.nano_of_day();
            LocalDateTime::from_parts(local.posix_day(), nod - nod % unit)
        }
    }
}

fn ceiling(field: Field, local: &LocalDateTime) -> LocalDateTime {
    let date = local.date();
    let end_of_day = NANOS_PER_DAY - 1;
    match field {
        Field::Year => LocalDateTime::from_parts(days_from_civil(date.year(), 12, 31), end_of_day),
        Field::Month => {
            let last = length_of_month(date.year(), date.month());
            LocalDateTime::from_parts(days_from_civil(date.year(), date.month(), last), end_of_day)
        }
        Field::DayOfMonth | Field::DayOfYear => {
            LocalDateTime::from_parts(local.posix_day(), end_of_day)
        }
        time_field => {
            let unit = time_field.unit_nanos().unwrap_or(1);
            let nod = local.nano_of_day();
            LocalDateTime::from_parts(local.posix_day(), nod - nod % unit + unit - 1)
        }
    }
}
