// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! Duration units.
//!
//! [`SiUnit`] counts real elapsed SI seconds on the UTC axis, so an inserted
//! leap second is one tick.  [`TimeUnit`] is the civil/engineering family on
//! the POSIX axis where every day has exactly 86 400 seconds.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Units of real elapsed time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SiUnit {
    Seconds,
    Nanoseconds,
}

/// Leap-second unaware units, ordered from coarse to fine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl TimeUnit {
    /// Length in POSIX seconds for units of one second or more.
    pub(crate) const fn seconds(self) -> Option<i64> {
        match self {
            TimeUnit::Days => Some(86_400),
            TimeUnit::Hours => Some(3_600),
            TimeUnit::Minutes => Some(60),
            TimeUnit::Seconds => Some(1),
            _ => None,
        }
    }

    /// Length in nanoseconds for sub-second units.
    pub(crate) const fn nanos(self) -> Option<i64> {
        match self {
            TimeUnit::Milliseconds => Some(1_000_000),
            TimeUnit::Microseconds => Some(1_000),
            TimeUnit::Nanoseconds => Some(1),
            _ => None,
        }
    }

    /// Nominal length in seconds.
    pub fn length(self) -> f64 {
        match self.nanos() {
            Some(n) => n as f64 / 1e9,
            None => self.seconds().unwrap_or(0) as f64,
        }
    }
}
