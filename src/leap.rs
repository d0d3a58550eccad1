// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! Leap-second registry.
//!
//! The engine consults leap seconds only through [`LeapSecondRegistry`].
//! Two counters are related by the registry:
//!
//! * **POSIX** seconds since 1970, where every day has 86 400 seconds;
//! * **UTC** seconds since 1972, where every inserted leap second is counted.
//!
//! ```text
//! enhance(posix) = posix − POSIX_UTC_DELTA + Σ shift(events ending before posix)
//! strip(utc)     = inverse of enhance
//! ```
//!
//! A positive leap second (23:59:60) has no POSIX second of its own: `strip`
//! maps it onto the POSIX second of 23:59:59, and the residual
//! `utc − enhance(strip(utc)) == 1` identifies it.
//!
//! [`LeapSecondTable`] is the bundled registry.  [`LeapSecondTable::iers`]
//! carries the IERS Bulletin C history 1972–2016; other tables can be parsed
//! from text with [`LeapSecondTable::parse`].

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::calendar::{days_from_civil, CivilDate};
use crate::error::{InstantError, InstantResult};
use crate::scales::{POSIX_UTC_DELTA, SECONDS_PER_DAY};

/// A registered leap second: the shift applied at the end of `date`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LeapSecondEvent {
    /// Last civil day before the shift takes effect.
    pub date: CivilDate,
    /// `+1` inserts 23:59:60, `-1` removes 23:59:59.
    pub shift: i8,
}

/// Read-only access to leap-second data.
pub trait LeapSecondRegistry: Send + Sync + fmt::Debug {
    /// `false` when leap seconds are suppressed by configuration.
    fn is_enabled(&self) -> bool;

    /// `true` if the data may contain negative leap seconds.
    fn supports_negative_leap(&self) -> bool;

    /// POSIX seconds → UTC seconds since 1972.
    fn enhance(&self, posix: i64) -> i64;

    /// UTC seconds since 1972 → POSIX seconds.
    fn strip(&self, utc: i64) -> i64;

    /// `true` if `utc` denotes an inserted leap second.
    fn is_positive_leap(&self, utc: i64) -> bool;

    /// Shift applied at the end of `date` (`-1`, `0` or `+1`).
    fn shift_at(&self, date: CivilDate) -> i8;

    /// First event whose leap second lies strictly after `after_utc`.
    fn next_event(&self, after_utc: i64) -> Option<LeapSecondEvent>;
}

#[derive(Debug, Copy, Clone)]
struct Entry {
    event: LeapSecondEvent,
    /// POSIX second of the midnight that follows the event date.
    midnight: i64,
    /// First UTC second counted with this event applied.
    threshold: i64,
    /// Accumulated shifts including this event.
    cumulative: i64,
}

/// In-memory leap-second table.
#[derive(Debug, Clone)]
pub struct LeapSecondTable {
    enabled: bool,
    entries: Vec<Entry>,
}

/// Positive leap seconds announced by IERS Bulletin C (last day before the shift).
const IERS_EVENTS: [(i64, u8, u8); 27] = [
    (1972, 6, 30),
    (1972, 12, 31),
    (1973, 12, 31),
    (1974, 12, 31),
    (1975, 12, 31),
    (1976, 12, 31),
    (1977, 12, 31),
    (1978, 12, 31),
    (1979, 12, 31),
    (1981, 6, 30),
    (1982, 6, 30),
    (1983, 6, 30),
    (1985, 6, 30),
    (1987, 12, 31),
    (1989, 12, 31),
    (1990, 12, 31),
    (1992, 6, 30),
    (1993, 6, 30),
    (1994, 6, 30),
    (1995, 12, 31),
    (1997, 6, 30),
    (1998, 12, 31),
    (2005, 12, 31),
    (2008, 12, 31),
    (2012, 6, 30),
    (2015, 6, 30),
    (2016, 12, 31),
];

impl LeapSecondTable {
    /// The bundled IERS history (TAI − UTC = 37 s since 2017-01-01).
    pub fn iers() -> Self {
        let events = IERS_EVENTS.iter().filter_map(|&(y, m, d)| {
            CivilDate::new(y, m, d).map(|date| LeapSecondEvent { date, shift: 1 })
        });
        Self::build(events.collect())
    }

    /// A table without any events; leap seconds stay enabled.
    pub fn empty() -> Self {
        Self::build(Vec::new())
    }

    /// Builds a table from events in strictly increasing date order.
    ///
    /// Events with shift `0` are ignored.  Events before 1972 or with a
    /// shift other than ±1 are rejected.
    pub fn from_events<I>(events: I) -> InstantResult<Self>
    where
        I: IntoIterator<Item = LeapSecondEvent>,
    {
        let mut accepted: Vec<LeapSecondEvent> = Vec::new();
        for (index, event) in events.into_iter().enumerate() {
            check_event(&accepted, &event, index + 1)?;
            if event.shift != 0 {
                accepted.push(event);
            }
        }
        Ok(Self::build(accepted))
    }

    /// Parses the `YYYY-MM-DD, +1` text form (one event per line, `#` comments).
    pub fn parse(text: &str) -> InstantResult<Self> {
        let mut accepted: Vec<LeapSecondEvent> = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            let event = parse_line(content, line)?;
            check_event(&accepted, &event, line)?;
            if event.shift != 0 {
                accepted.push(event);
            }
        }
        Ok(Self::build(accepted))
    }

    /// Same data, but leap seconds suppressed.
    pub fn suppressed(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Number of registered events.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered events in chronological order.
    pub fn events(&self) -> impl Iterator<Item = LeapSecondEvent> + '_ {
        self.entries.iter().map(|e| e.event)
    }

    fn build(events: Vec<LeapSecondEvent>) -> Self {
        let mut cumulative = 0i64;
        let entries = events
            .into_iter()
            .map(|event| {
                let day = days_from_civil(event.date.year(), event.date.month(), event.date.day());
                let midnight = (day + 1) * SECONDS_PER_DAY;
                cumulative += i64::from(event.shift);
                let utc_midnight = midnight - POSIX_UTC_DELTA + cumulative;
                let threshold = if event.shift > 0 {
                    utc_midnight - 1
                } else {
                    utc_midnight
                };
                Entry {
                    event,
                    midnight,
                    threshold,
                    cumulative,
                }
            })
            .collect();
        Self {
            enabled: true,
            entries,
        }
    }
}

impl Default for LeapSecondTable {
    fn default() -> Self {
        Self::iers()
    }
}

impl FromStr for LeapSecondTable {
    type Err = InstantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl LeapSecondRegistry for LeapSecondTable {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn supports_negative_leap(&self) -> bool {
        self.enabled && self.entries.iter().any(|e| e.event.shift < 0)
    }

    fn enhance(&self, posix: i64) -> i64 {
        let base = posix.saturating_sub(POSIX_UTC_DELTA);
        if !self.enabled {
            return base;
        }
        let idx = self.entries.partition_point(|e| e.midnight <= posix);
        if idx == 0 {
            base
        } else {
            base.saturating_add(self.entries[idx - 1].cumulative)
        }
    }

    fn strip(&self, utc: i64) -> i64 {
        let base = utc.saturating_add(POSIX_UTC_DELTA);
        if !self.enabled {
            return base;
        }
        let idx = self.entries.partition_point(|e| e.threshold <= utc);
        if idx == 0 {
            base
        } else {
            base.saturating_sub(self.entries[idx - 1].cumulative)
        }
    }

    fn is_positive_leap(&self, utc: i64) -> bool {
        self.enabled
            && self
                .entries
                .binary_search_by_key(&utc, |e| e.threshold)
                .map(|i| self.entries[i].event.shift > 0)
                .unwrap_or(false)
    }

    fn shift_at(&self, date: CivilDate) -> i8 {
        if !self.enabled {
            return 0;
        }
        self.entries
            .binary_search_by_key(&date, |e| e.event.date)
            .map(|i| self.entries[i].event.shift)
            .unwrap_or(0)
    }

    fn next_event(&self, after_utc: i64) -> Option<LeapSecondEvent> {
        if !self.enabled {
            return None;
        }
        let idx = self.entries.partition_point(|e| e.threshold <= after_utc);
        self.entries.get(idx).map(|e| e.event)
    }
}

fn check_event(
    accepted: &[LeapSecondEvent],
    event: &LeapSecondEvent,
    line: usize,
) -> InstantResult<()> {
    if !(-1..=1).contains(&event.shift) {
        return Err(InstantError::InvalidLeapTable {
            line,
            reason: format!("shift must be -1, 0 or +1, got {}", event.shift),
        });
    }
    if event.date.year() < 1972 {
        return Err(InstantError::InvalidLeapTable {
            line,
            reason: format!("leap seconds start in 1972, got {}", event.date),
        });
    }
    if let Some(last) = accepted.last() {
        if event.date <= last.date {
            return Err(InstantError::InvalidLeapTable {
                line,
                reason: format!("{} is not after {}", event.date, last.date),
            });
        }
    }
    Ok(())
}

fn parse_line(content: &str, line: usize) -> InstantResult<LeapSecondEvent> {
    let invalid = |reason: String| InstantError::InvalidLeapTable { line, reason };

    let (date_part, shift_part) = content
        .split_once(',')
        .ok_or_else(|| invalid(format!("expected `YYYY-MM-DD, shift`, got `{content}`")))?;

    let mut fields = date_part.trim().splitn(3, '-');
    let mut next_number = |name: &str| -> InstantResult<i64> {
        fields
            .next()
            .and_then(|f| f.trim().parse::<i64>().ok())
            .ok_or_else(|| invalid(format!("bad {name} in `{}`", date_part.trim())))
    };
    let year = next_number("year")?;
    let month = next_number("month")?;
    let day = next_number("day")?;
    let date = u8::try_from(month)
        .ok()
        .zip(u8::try_from(day).ok())
        .and_then(|(m, d)| CivilDate::new(year, m, d))
        .ok_or_else(|| invalid(format!("no such date `{}`", date_part.trim())))?;

    let shift = shift_part
        .trim()
        .trim_start_matches('+')
        .parse::<i8>()
        .map_err(|_| invalid(format!("bad shift `{}`", shift_part.trim())))?;

    Ok(LeapSecondEvent { date, shift })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i64, m: u8, d: u8) -> CivilDate {
        CivilDate::new(y, m, d).unwrap()
    }

    // 2012-06-30T23:59:59Z
    const POSIX_2012_LAST: i64 = 1_341_100_799;
    const UTC_2012_LAST: i64 = POSIX_2012_LAST - POSIX_UTC_DELTA + 24;

    #[test]
    fn iers_table_totals_27_events() {
        let table = LeapSecondTable::iers();
        assert_eq!(table.len(), 27);
        assert!(table.is_enabled());
        assert!(!table.supports_negative_leap());
        // TAI − UTC = 10 + 27 = 37 s since 2017.
        let posix_2020 = 1_577_836_800;
        assert_eq!(table.enhance(posix_2020), posix_2020 - POSIX_UTC_DELTA + 27);
    }

    #[test]
    fn enhance_strip_around_positive_leap() {
        let table = LeapSecondTable::iers();
        assert_eq!(table.enhance(POSIX_2012_LAST), UTC_2012_LAST);
        assert_eq!(table.strip(UTC_2012_LAST), POSIX_2012_LAST);

        // The leap second itself strips onto 23:59:59.
        let leap = UTC_2012_LAST + 1;
        assert_eq!(table.strip(leap), POSIX_2012_LAST);
        assert_eq!(leap - table.enhance(table.strip(leap)), 1);
        assert!(table.is_positive_leap(leap));
        assert!(!table.is_positive_leap(UTC_2012_LAST));

        // Next midnight.
        assert_eq!(table.strip(leap + 1), POSIX_2012_LAST + 1);
        assert_eq!(table.enhance(POSIX_2012_LAST + 1), leap + 1);
    }

    #[test]
    fn before_1972_is_a_plain_offset() {
        let table = LeapSecondTable::iers();
        assert_eq!(table.enhance(0), -POSIX_UTC_DELTA);
        assert_eq!(table.strip(-1), POSIX_UTC_DELTA - 1);
    }

    #[test]
    fn shift_and_next_event() {
        let table = LeapSecondTable::iers();
        assert_eq!(table.shift_at(date(2012, 6, 30)), 1);
        assert_eq!(table.shift_at(date(2012, 7, 1)), 0);

        let next = table.next_event(UTC_2012_LAST).unwrap();
        assert_eq!(next.date, date(2012, 6, 30));
        let after = table.next_event(UTC_2012_LAST + 1).unwrap();
        assert_eq!(after.date, date(2015, 6, 30));
        assert!(table.next_event(i64::MAX / 2).is_none());
    }

    #[test]
    fn negative_leap_skips_a_posix_second() {
        let table = LeapSecondTable::from_events([
            LeapSecondEvent {
                date: date(1972, 6, 30),
                shift: 1,
            },
            LeapSecondEvent {
                date: date(2030, 12, 31),
                shift: -1,
            },
        ])
        .unwrap();
        assert!(table.supports_negative_leap());

        // 2030-12-31T23:59:59Z is removed.
        let removed = days_from_civil(2031, 1, 1) * SECONDS_PER_DAY - 1;
        assert!(table.strip(table.enhance(removed)) > removed);
        assert_eq!(table.strip(table.enhance(removed - 1)), removed - 1);
        assert_eq!(table.enhance(removed), table.enhance(removed + 1));
        assert_eq!(table.strip(table.enhance(removed + 1)), removed + 1);
    }

    #[test]
    fn suppressed_table_is_inert() {
        let table = LeapSecondTable::iers().suppressed();
        assert!(!table.is_enabled());
        assert_eq!(table.enhance(POSIX_2012_LAST), POSIX_2012_LAST - POSIX_UTC_DELTA);
        assert_eq!(table.shift_at(date(2012, 6, 30)), 0);
        assert!(table.next_event(0).is_none());
    }

    #[test]
    fn parses_text_form() {
        let text = "# leap seconds\n1972-06-30, +1\n\n1972-12-31, 1 # year end\n";
        let table: LeapSecondTable = text.parse().unwrap();
        let events: Vec<_> = table.events().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].date, date(1972, 12, 31));
    }

    #[test]
    fn rejects_malformed_tables() {
        let err = LeapSecondTable::parse("1972-06-30 +1").unwrap_err();
        assert!(matches!(err, InstantError::InvalidLeapTable { line: 1, .. }));

        let err = LeapSecondTable::parse("1972-12-31, +1\n1972-06-30, +1").unwrap_err();
        assert!(matches!(err, InstantError::InvalidLeapTable { line: 2, .. }));

        let err = LeapSecondTable::parse("1969-12-31, +1").unwrap_err();
        assert!(matches!(err, InstantError::InvalidLeapTable { .. }));

        let err = LeapSecondTable::parse("1972-02-30, +1").unwrap_err();
        assert!(matches!(err, InstantError::InvalidLeapTable { .. }));

        let err = LeapSecondTable::parse("1972-06-30, +2").unwrap_err();
        assert!(matches!(err, InstantError::InvalidLeapTable { .. }));
    }
}
