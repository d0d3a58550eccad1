// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! Scale conversion between `(elapsed, nanosecond, scale)` triples and the
//! internal POSIX representation of [`UniversalInstant`].
//!
//! | Scale | To internal | From internal |
//! |-------|-------------|---------------|
//! | POSIX | identity | identity |
//! | UTC | strip leap seconds | enhance |
//! | TAI | `UTC + 10 s` after 1972, ΔT bridge before | same |
//! | GPS | `UTC − UTC_GPS_DELTA` | same, rejected before 1980-01-06 |
//! | TT | `UTC + 42.184 s` after 1972, `UT1 + ΔT` before | same |
//! | UT | `UT1 + ΔT − 42.184 s` after 1972, POSIX before | same |
//!
//! Conversions bridging through ΔT are approximate: ΔT is an empirical
//! estimate, so values before 1972 on TAI, TT and UT are best effort.

use tracing::error;

use crate::context::TimeContext;
use crate::error::{InstantError, InstantResult};
use crate::instant::UniversalInstant;
use crate::scales::{
    TimeScale, NANOS_PER_SECOND, POSIX_GPS_DELTA, POSIX_UTC_DELTA, SECONDS_PER_DAY, TAI_UTC_1972,
    TT_UTC_NANOS, TT_UTC_SECONDS, UTC_EPOCH_POSIX_DAY, UTC_GPS_DELTA, UTC_TAI_DELTA,
};

const NANOS_F64: f64 = NANOS_PER_SECOND as f64;

/// `TT − UTC` at 1972-01-01 in decimal seconds.
const TT_UTC_1972: f64 = 42.184;

/// Bidirectional mapping between scale readings and instants.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScaleConverter;

impl ScaleConverter {
    /// Builds the instant denoted by `elapsed` seconds plus `nanosecond` on `scale`.
    pub fn to_instant(
        elapsed: i64,
        nanosecond: i64,
        scale: TimeScale,
        ctx: &TimeContext,
    ) -> InstantResult<UniversalInstant> {
        if !(0..NANOS_PER_SECOND).contains(&nanosecond) {
            return Err(InstantError::NanosecondOutOfRange(nanosecond));
        }
        if scale == TimeScale::Posix {
            return UniversalInstant::checked(elapsed, nanosecond, false);
        }
        if !ctx.leap_seconds().is_enabled() {
            return Err(InstantError::LeapSecondsDisabled { scale });
        }

        let (utc, nanos) = match scale {
            TimeScale::Posix | TimeScale::Utc => (elapsed, nanosecond),
            TimeScale::Tai => tai_to_utc(elapsed, nanosecond, ctx)?,
            TimeScale::Gps => {
                let utc = elapsed
                    .checked_add(UTC_GPS_DELTA)
                    .ok_or_else(|| InstantError::overflow("GPS conversion"))?;
                if utc < UTC_GPS_DELTA {
                    return Err(InstantError::BeforeScaleEpoch {
                        scale,
                        epoch: "1980-01-06",
                        value: elapsed,
                    });
                }
                (utc, nanosecond)
            }
            TimeScale::Tt => {
                if elapsed < TT_UTC_SECONDS
                    || (elapsed == TT_UTC_SECONDS && nanosecond < TT_UTC_NANOS)
                {
                    utc_from_tt(elapsed as f64 + nanosecond as f64 / NANOS_F64, ctx)
                } else {
                    sub_tt_offset(elapsed, nanosecond)
                }
            }
            TimeScale::Ut => {
                if elapsed < 0 {
                    (elapsed, nanosecond)
                } else {
                    let day = elapsed.div_euclid(SECONDS_PER_DAY) + UTC_EPOCH_POSIX_DAY;
                    let ut = elapsed as f64 + nanosecond as f64 / NANOS_F64;
                    split_seconds(ut + ctx.delta_t_on_day(day).value() - TT_UTC_1972)
                }
            }
        };

        Self::from_utc_elapsed(utc, nanos, ctx)
    }

    /// Builds an instant from continuous UTC seconds since 1972.
    ///
    /// The registry strips accumulated leap seconds; a residual of one marks
    /// an inserted leap second.
    pub(crate) fn from_utc_elapsed(
        utc: i64,
        nanosecond: i64,
        ctx: &TimeContext,
    ) -> InstantResult<UniversalInstant> {
        let registry = ctx.leap_seconds();
        let posix = registry.strip(utc);
        if !UniversalInstant::in_range(posix) {
            return Err(InstantError::OutOfRange(posix));
        }
        let residual = utc.saturating_sub(registry.enhance(posix));
        let leap = match residual {
            0 => false,
            _ if posix == UniversalInstant::MAX.posix_seconds() => false,
            1 => true,
            _ => {
                error!(utc, posix, residual, "leap second registry returned an impossible shift");
                return Err(InstantError::InconsistentLeapShift {
                    elapsed: utc,
                    residual,
                });
            }
        };
        UniversalInstant::checked(posix, nanosecond, leap)
    }

    /// Reads `instant` on `scale` as `(elapsed seconds, nanosecond)`.
    pub fn project(
        instant: &UniversalInstant,
        scale: TimeScale,
        ctx: &TimeContext,
    ) -> InstantResult<(i64, u32)> {
        let posix = instant.posix_seconds();
        let nanos = i64::from(instant.nanosecond());

        let (elapsed, nanos) = match scale {
            TimeScale::Posix => (posix, nanos),
            TimeScale::Utc => (utc_elapsed(instant, ctx), nanos),
            TimeScale::Tai => {
                let utc = utc_elapsed(instant, ctx);
                let (tai, nanos) = if utc < 0 {
                    let (tv, nano) = split_seconds(tt_before_1972(instant, ctx));
                    let tai = tv - (TT_UTC_SECONDS - TAI_UTC_1972) + UTC_TAI_DELTA;
                    let nano = nano - TT_UTC_NANOS;
                    if nano < 0 {
                        (tai - 1, nano + NANOS_PER_SECOND)
                    } else {
                        (tai, nano)
                    }
                } else {
                    (utc + UTC_TAI_DELTA + TAI_UTC_1972, nanos)
                };
                if tai < 0 {
                    return Err(InstantError::BeforeScaleEpoch {
                        scale,
                        epoch: "1958-01-01",
                        value: tai,
                    });
                }
                (tai, nanos)
            }
            TimeScale::Gps => {
                if posix < POSIX_GPS_DELTA {
                    return Err(InstantError::BeforeScaleEpoch {
                        scale,
                        epoch: "1980-01-06",
                        value: posix,
                    });
                }
                let utc = utc_elapsed(instant, ctx);
                // Without a leap table the nine pre-1980 leap seconds are still owed.
                let gps = if ctx.leap_seconds().is_enabled() {
                    utc
                } else {
                    utc + 9
                };
                (gps - UTC_GPS_DELTA, nanos)
            }
            TimeScale::Tt => {
                if posix < POSIX_UTC_DELTA {
                    split_seconds(tt_before_1972(instant, ctx))
                } else {
                    let utc = utc_elapsed(instant, ctx);
                    let nano = nanos + TT_UTC_NANOS;
                    if nano >= NANOS_PER_SECOND {
                        (utc + TT_UTC_SECONDS + 1, nano - NANOS_PER_SECOND)
                    } else {
                        (utc + TT_UTC_SECONDS, nano)
                    }
                }
            }
            TimeScale::Ut => {
                if posix < POSIX_UTC_DELTA {
                    (posix - POSIX_UTC_DELTA, nanos)
                } else {
                    let day = posix.div_euclid(SECONDS_PER_DAY);
                    let ut = utc_elapsed(instant, ctx) as f64
                        + TT_UTC_1972
                        + nanos as f64 / NANOS_F64
                        - ctx.delta_t_on_day(day).value();
                    split_seconds(ut)
                }
            }
        };

        Ok((elapsed, nanos as u32))
    }
}

/// UTC seconds since 1972 counting leap seconds (POSIX offset if suppressed).
pub(crate) fn utc_elapsed(instant: &UniversalInstant, ctx: &TimeContext) -> i64 {
    let registry = ctx.leap_seconds();
    if registry.is_enabled() {
        let utc = registry.enhance(instant.posix_seconds());
        if instant.is_leap_second() {
            utc + 1
        } else {
            utc
        }
    } else {
        instant.posix_seconds() - POSIX_UTC_DELTA
    }
}

fn tai_to_utc(elapsed: i64, nanosecond: i64, ctx: &TimeContext) -> InstantResult<(i64, i64)> {
    if elapsed < 0 {
        return Err(InstantError::BeforeScaleEpoch {
            scale: TimeScale::Tai,
            epoch: "1958-01-01",
            value: elapsed,
        });
    }
    if elapsed < UTC_TAI_DELTA + TAI_UTC_1972 {
        let mut tv = elapsed + (TT_UTC_SECONDS - TAI_UTC_1972) - UTC_TAI_DELTA;
        let mut nanos = nanosecond + TT_UTC_NANOS;
        if nanos >= NANOS_PER_SECOND {
            tv += 1;
            nanos -= NANOS_PER_SECOND;
        }
        return Ok(utc_from_tt(tv as f64 + nanos as f64 / NANOS_F64, ctx));
    }
    Ok((elapsed - UTC_TAI_DELTA - TAI_UTC_1972, nanosecond))
}

/// `TT − 42.184 s` with nanosecond borrow.
fn sub_tt_offset(elapsed: i64, nanosecond: i64) -> (i64, i64) {
    let nanos = nanosecond - TT_UTC_NANOS;
    if nanos < 0 {
        (elapsed - TT_UTC_SECONDS - 1, nanos + NANOS_PER_SECOND)
    } else {
        (elapsed - TT_UTC_SECONDS, nanos)
    }
}

/// Pre-1972 bridge `UT1 = TT − ΔT`.
///
/// ΔT is first looked up on the date approximated from the raw TT value,
/// then once more on the date of the resulting UT.
fn utc_from_tt(tt: f64, ctx: &TimeContext) -> (i64, i64) {
    let day_of = |seconds: f64| {
        (seconds.floor() as i64).div_euclid(SECONDS_PER_DAY) + UTC_EPOCH_POSIX_DAY
    };

    let approx = day_of(tt - TT_UTC_1972);
    let mut ut = tt - ctx.delta_t_on_day(approx).value();
    let refined = day_of(ut);
    if refined != approx {
        ut = tt - ctx.delta_t_on_day(refined).value();
    }
    split_seconds(ut)
}

/// Pre-1972 TT reading `ΔT + UT1` in decimal seconds since 1972.
fn tt_before_1972(instant: &UniversalInstant, ctx: &TimeContext) -> f64 {
    let posix = instant.posix_seconds();
    let delta_t = ctx.delta_t_on_day(posix.div_euclid(SECONDS_PER_DAY)).value();
    delta_t + (posix - POSIX_UTC_DELTA) as f64 + f64::from(instant.nanosecond()) / NANOS_F64
}

/// Splits decimal seconds into whole seconds and nanoseconds.
///
/// A fraction within one nanosecond of the next second rounds up, so the
/// nanosecond field never reaches 1e9 through floating-point noise.
pub(crate) fn split_seconds(value: f64) -> (i64, i64) {
    let floor = value.floor();
    let secs = floor as i64;
    if NANOS_F64 - (value - floor) * NANOS_F64 < 1.0 {
        return (secs + 1, 0);
    }
    let nanos = match secs.checked_mul(NANOS_PER_SECOND) {
        Some(scaled) => (value * NANOS_F64 - scaled as f64) as i64,
        None => ((value - floor) * NANOS_F64) as i64,
    };
    (secs, nanos.clamp(0, NANOS_PER_SECOND - 1))
}
