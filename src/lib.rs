// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! Leap-second aware universal instants.
//!
//! A [`UniversalInstant`] is one point on a nanosecond time line that can be
//! read on several time scales.  It stores POSIX seconds, a nanosecond
//! fraction and a flag for an inserted leap second (23:59:60), so leap
//! seconds are representable, ordered and counted by SI arithmetic.
//!
//! # Core types
//!
//! - [`UniversalInstant`]: the instant value, immutable and `Copy`.
//! - [`ScaleConverter`]: elapsed-time conversion between scales and instants.
//! - [`Adjustment`]: zoned field edits that respect leap seconds.
//! - [`TimeLineStepper`] / [`InstantRange`]: nanosecond stepping and ranges.
//! - [`InstantCodec`]: 9 or 13 byte wire form.
//! - [`TimeContext`]: leap table, ΔT model and calendar passed to every
//!   operation that needs them.
//!
//! # Time scales
//!
//! | Scale | Epoch | Leap seconds |
//! |-------|-------|--------------|
//! | [`TimeScale::Posix`] | 1970-01-01 | ignored |
//! | [`TimeScale::Utc`] | 1972-01-01 | counted |
//! | [`TimeScale::Tai`] | 1958-01-01 | continuous |
//! | [`TimeScale::Gps`] | 1980-01-06 | continuous |
//! | [`TimeScale::Tt`] | 1972-01-01 | continuous, TAI + 32.184 s |
//! | [`TimeScale::Ut`] | 1972-01-01 | Earth rotation, TT − ΔT |
//!
//! # Example
//!
//! ```rust
//! use leapmoment::{SiUnit, TimeContext, TimeScale, UniversalInstant};
//!
//! let ctx = TimeContext::default();
//! let leap = UniversalInstant::of(1_278_028_824, 0, TimeScale::Utc, &ctx).unwrap();
//! assert_eq!(leap.to_string(), "2012-06-30T23:59:60Z");
//!
//! let next = leap.plus_si(1, SiUnit::Seconds, &ctx).unwrap();
//! assert_eq!(next.to_string(), "2012-07-01T00:00:00Z");
//! assert_eq!(next.posix_seconds(), leap.posix_seconds() + 1);
//! ```

mod adjust;
mod calendar;
mod codec;
mod context;
mod convert;
mod delta_t;
mod error;
pub(crate) mod instant;
mod leap;
pub(crate) mod scales;
mod timeline;
mod units;
mod zone;

// ── Re-exports ────────────────────────────────────────────────────────────

pub use adjust::{Adjustment, Field, Operation};
pub use calendar::{CivilDate, CivilDateProvider, ProlepticGregorian, MAX_YEAR, MIN_YEAR};
pub use codec::{InstantCodec, INSTANT_TAG};
pub use context::{ContextConfig, LeapSecondMode, TimeContext, ENV_LEAP_SECONDS, ENV_LEAP_TABLE};
pub use convert::ScaleConverter;
pub use delta_t::{DeltaTProvider, PiecewiseDeltaT};
pub use error::{ErrorKind, InstantError, InstantResult};
pub use instant::UniversalInstant;
pub use leap::{LeapSecondEvent, LeapSecondRegistry, LeapSecondTable};
pub use scales::{
    TimeScale, NANOS_PER_SECOND, POSIX_GPS_DELTA, POSIX_UTC_DELTA, SECONDS_PER_DAY, TAI_GPS_OFFSET,
    TAI_UTC_1972, TT_MINUS_TAI, UTC_GPS_DELTA, UTC_TAI_DELTA,
};
pub use timeline::{InstantRange, Steps, TimeLineStepper};
pub use units::{SiUnit, TimeUnit};
pub use zone::{FixedZone, LocalDateTime, ZoneOffset, ZoneRules};
