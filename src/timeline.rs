// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! Time-line stepping and half-open instant ranges.
//!
//! [`TimeLineStepper`] moves an instant by the smallest representable unit.
//! From 1972 on, with leap seconds enabled, that is one SI nanosecond, so
//! stepping walks through 23:59:60.  Before 1972 (or with leap seconds
//! suppressed) it is one POSIX nanosecond.
//!
//! [`InstantRange`] is a `[start, end)` interval whose
//! [`steps`](InstantRange::steps) iterator is driven by the stepper.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::context::TimeContext;
use crate::error::InstantResult;
use crate::instant::UniversalInstant;
use crate::scales::{NANOS_PER_SECOND, POSIX_UTC_DELTA};
use crate::units::{SiUnit, TimeUnit};

/// Nanosecond stepping along the universal time line.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct TimeLineStepper;

impl TimeLineStepper {
    /// Next representable instant, `None` beyond [`UniversalInstant::MAX`].
    pub fn step_forward(
        &self,
        instant: &UniversalInstant,
        ctx: &TimeContext,
    ) -> Option<UniversalInstant> {
        self.step(instant, 1, ctx)
    }

    /// Previous representable instant, `None` before [`UniversalInstant::MIN`].
    pub fn step_backward(
        &self,
        instant: &UniversalInstant,
        ctx: &TimeContext,
    ) -> Option<UniversalInstant> {
        self.step(instant, -1, ctx)
    }

    fn step(
        &self,
        instant: &UniversalInstant,
        delta: i64,
        ctx: &TimeContext,
    ) -> Option<UniversalInstant> {
        if ctx.leap_seconds().is_enabled() && instant.posix_seconds() > POSIX_UTC_DELTA {
            return instant.plus_si(delta, SiUnit::Nanoseconds, ctx).ok();
        }
        let nanos = i64::from(instant.nanosecond()) + delta;
        let posix = instant
            .posix_seconds()
            .checked_add(nanos.div_euclid(NANOS_PER_SECOND))?;
        UniversalInstant::checked(posix, nanos.rem_euclid(NANOS_PER_SECOND), false).ok()
    }
}

/// Half-open range `[start, end)` of universal instants.
///
/// ```rust
/// use leapmoment::{InstantRange, SiUnit, TimeContext, UniversalInstant};
///
/// let ctx = TimeContext::default();
/// // The last minute of 2012-06-30 lasts 61 SI seconds.
/// let range = InstantRange::new(
///     UniversalInstant::of_posix(1_341_100_740, 0).unwrap(),
///     UniversalInstant::of_posix(1_341_100_800, 0).unwrap(),
/// );
/// assert_eq!(range.duration(SiUnit::Seconds, &ctx).unwrap(), 61);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InstantRange {
    pub start: UniversalInstant,
    pub end: UniversalInstant,
}

impl InstantRange {
    pub fn new(start: UniversalInstant, end: UniversalInstant) -> Self {
        InstantRange { start, end }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// `true` if `start <= instant < end`.
    #[inline]
    pub fn contains(&self, instant: &UniversalInstant) -> bool {
        self.start <= *instant && *instant < self.end
    }

    /// SI length of the range, counting leap seconds.
    pub fn duration(&self, unit: SiUnit, ctx: &TimeContext) -> InstantResult<i64> {
        self.start.until_si(&self.end, unit, ctx)
    }

    /// Leap-second unaware length on the POSIX axis.
    pub fn civil_duration(&self, unit: TimeUnit) -> InstantResult<i64> {
        self.start.until(&self.end, unit)
    }

    /// Overlap of two ranges; `None` if they only touch or are disjoint.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            Some(Self::new(start, end))
        } else {
            None
        }
    }

    /// Every representable instant of the range, in order.
    pub fn steps<'a>(&self, ctx: &'a TimeContext) -> Steps<'a> {
        Steps {
            next: (!self.is_empty()).then_some(self.start),
            end: self.end,
            ctx,
        }
    }
}

impl fmt::Display for InstantRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Iterator returned by [`InstantRange::steps`].
#[derive(Debug, Clone)]
pub struct Steps<'a> {
    next: Option<UniversalInstant>,
    end: UniversalInstant,
    ctx: &'a TimeContext,
}

impl Iterator for Steps<'_> {
    type Item = UniversalInstant;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = TimeLineStepper
            .step_forward(&current, self.ctx)
            .filter(|n| *n < self.end);
        Some(current)
    }
}
