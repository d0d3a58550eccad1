// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! Time scales and their fixed epoch offsets.
//!
//! Every [`UniversalInstant`](crate::UniversalInstant) can be read on any of
//! the scales below.  Each scale counts elapsed seconds from its own epoch:
//!
//! | Scale | Epoch | Relation |
//! |-------|-------|----------|
//! | [`TimeScale::Posix`] | 1970-01-01 | 86 400 s per day, leap seconds ignored |
//! | [`TimeScale::Utc`]   | 1972-01-01 | counts inserted leap seconds |
//! | [`TimeScale::Tai`]   | 1958-01-01 | `TAI = UTC + 10 s + leap seconds` after 1972 |
//! | [`TimeScale::Gps`]   | 1980-01-06 | `GPS = TAI − 19 s` |
//! | [`TimeScale::Tt`]    | 1972-01-01 | `TT = TAI + 32.184 s` |
//! | [`TimeScale::Ut`]    | 1972-01-01 | `UT1 = TT − ΔT` |
//!
//! Before 1972 there are no leap seconds and UTC coincides with POSIX time.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The time scales an instant can be projected onto.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeScale {
    /// Unix time.
    Posix,
    /// Coordinated Universal Time, continuous count since 1972.
    Utc,
    /// International Atomic Time.
    Tai,
    /// GPS time.
    Gps,
    /// Terrestrial Time.
    Tt,
    /// Universal Time (UT1), tied to Earth rotation.
    Ut,
}

impl TimeScale {
    /// All scales in declaration order.
    pub const ALL: [TimeScale; 6] = [
        TimeScale::Posix,
        TimeScale::Utc,
        TimeScale::Tai,
        TimeScale::Gps,
        TimeScale::Tt,
        TimeScale::Ut,
    ];

    /// Label used by the scale-tagged text form (`UTC-2012-06-30T23:59:60Z`).
    pub const fn label(self) -> &'static str {
        match self {
            TimeScale::Posix => "POSIX",
            TimeScale::Utc => "UTC",
            TimeScale::Tai => "TAI",
            TimeScale::Gps => "GPS",
            TimeScale::Tt => "TT",
            TimeScale::Ut => "UT",
        }
    }

    /// `true` for scales whose counter runs continuously in SI seconds.
    pub const fn is_continuous(self) -> bool {
        matches!(self, TimeScale::Utc | TimeScale::Tai | TimeScale::Gps | TimeScale::Tt)
    }
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Epoch table
// ---------------------------------------------------------------------------

/// Seconds per (POSIX) day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Nanoseconds per second.
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// POSIX seconds at the UTC epoch 1972-01-01.
pub const POSIX_UTC_DELTA: i64 = 2 * 365 * SECONDS_PER_DAY;

/// Seconds between the TAI epoch 1958-01-01 and the UTC epoch 1972-01-01.
pub const UTC_TAI_DELTA: i64 = ((1972 - 1958) * 365 + 3) * SECONDS_PER_DAY;

/// UTC seconds at the GPS epoch 1980-01-06, including the nine leap seconds
/// inserted between 1972 and 1980.
pub const UTC_GPS_DELTA: i64 = ((1980 - 1972) * 365 + 2 + 5) * SECONDS_PER_DAY + 9;

/// POSIX seconds at the GPS epoch 1980-01-06.
pub const POSIX_GPS_DELTA: i64 = POSIX_UTC_DELTA + UTC_GPS_DELTA - 9;

/// `TAI − UTC` at 1972-01-01.
pub const TAI_UTC_1972: i64 = 10;

/// `TAI − GPS`.
pub const TAI_GPS_OFFSET: i64 = 19;

/// `TT − TAI` in seconds.
pub const TT_MINUS_TAI: f64 = 32.184;

/// Integer part of `TT − UTC` at 1972-01-01 (10 s + 32.184 s).
pub(crate) const TT_UTC_SECONDS: i64 = 42;

/// Fractional part of `TT − UTC` in nanoseconds.
pub(crate) const TT_UTC_NANOS: i64 = 184_000_000;

/// Number of days between 1970-01-01 and 1972-01-01.
pub(crate) const UTC_EPOCH_POSIX_DAY: i64 = POSIX_UTC_DELTA / SECONDS_PER_DAY;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_offsets_match_calendar() {
        assert_eq!(POSIX_UTC_DELTA, 63_072_000);
        assert_eq!(POSIX_GPS_DELTA, 315_964_800);
        // 1958-01-01 is 378 691 200 s before the Unix epoch.
        assert_eq!(POSIX_UTC_DELTA - UTC_TAI_DELTA, -378_691_200);
    }

    #[test]
    fn tt_tai_relation() {
        let tt_utc = TT_UTC_SECONDS as f64 + TT_UTC_NANOS as f64 / 1e9;
        assert!((tt_utc - (TAI_UTC_1972 as f64 + TT_MINUS_TAI)).abs() < 1e-12);
    }

    #[test]
    fn labels() {
        let labels: Vec<_> = TimeScale::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels, ["POSIX", "UTC", "TAI", "GPS", "TT", "UT"]);
        assert_eq!(TimeScale::Gps.to_string(), "GPS");
        assert!(!TimeScale::Ut.is_continuous());
    }
}
