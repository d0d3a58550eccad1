// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! # ΔT (Delta T) collaborator
//!
//! **ΔT = TT − UT1** bridges the Earth-rotation scale `UT` and the uniform
//! scales.  The engine asks a [`DeltaTProvider`] for ΔT on a calendar date;
//! [`PiecewiseDeltaT`] is the bundled model:
//!
//! | Range | Model |
//! |-------|-------|
//! | before 948 CE | Stephenson & Houlden (1986) quadratic around 948 |
//! | 948–1620 | Stephenson & Houlden (1986) quadratic around 1850 |
//! | 1620–1992 | biennial table, Meeus ch. 9 |
//! | 1992–2026 | annual IERS/USNO observed values, linear interpolation |
//! | after 2026 | linear extrapolation at ~0.02 s/yr |
//!
//! The value is evaluated at 0h of the given date, so it is constant over a
//! day.
//!
//! ## Scientific References
//! * Stephenson & Houlden (1986): *Atlas of Historical Eclipse Maps*.
//! * Morrison & Stephenson (2004): "Historical values of the Earth's clock error".
//! * IERS Bulletin A (2025): observed ΔT values.

use std::fmt;

use qtty::{Days, Seconds, Simplify};

use crate::calendar::{days_from_civil, CivilDate};

/// Supplies ΔT = TT − UT1 for a calendar date.
pub trait DeltaTProvider: Send + Sync + fmt::Debug {
    /// ΔT in seconds at 0h UT of `date`.
    fn delta_t(&self, date: CivilDate) -> Seconds;
}

/// Meeus/IERS piecewise ΔT model.
#[derive(Debug, Default, Clone, Copy)]
pub struct PiecewiseDeltaT;

impl DeltaTProvider for PiecewiseDeltaT {
    fn delta_t(&self, date: CivilDate) -> Seconds {
        let day = days_from_civil(date.year(), date.month(), date.day());
        delta_t_from_jd(Days::new(day as f64 + JD_UNIX_EPOCH))
    }
}

/// Julian Day of 1970-01-01T00:00.
const JD_UNIX_EPOCH: f64 = 2_440_587.5;

/// Julian Day of J2000.0.
const JD_J2000: f64 = 2_451_545.0;

const JULIAN_CENTURY: Days = Days::new(36_525.0);

/// Total number of tabulated terms (biennial 1620–1992).
const TERMS: usize = 187;

/// Biennial ΔT table from 1620 to 1992 (in seconds), compiled by J. Meeus.
#[rustfmt::skip]
const DELTA_T: [Seconds; TERMS] = qtty::qtty_vec!(
    Seconds;
    124.0,115.0,106.0, 98.0, 91.0, 85.0, 79.0, 74.0, 70.0, 65.0,
     62.0, 58.0, 55.0, 53.0, 50.0, 48.0, 46.0, 44.0, 42.0, 40.0,
     37.0, 35.0, 33.0, 31.0, 28.0, 26.0, 24.0, 22.0, 20.0, 18.0,
     16.0, 14.0, 13.0, 12.0, 11.0, 10.0,  9.0,  9.0,  9.0,  9.0,
      9.0,  9.0,  9.0,  9.0, 10.0, 10.0, 10.0, 10.0, 10.0, 11.0,
     11.0, 11.0, 11.0, 11.0, 11.0, 11.0, 12.0, 12.0, 12.0, 12.0,
     12.0, 12.0, 13.0, 13.0, 13.0, 13.0, 14.0, 14.0, 14.0, 15.0,
     15.0, 15.0, 15.0, 16.0, 16.0, 16.0, 16.0, 16.0, 17.0, 17.0,
     17.0, 17.0, 17.0, 17.0, 17.0, 17.0, 16.0, 16.0, 15.0, 14.0,
     13.7, 13.1, 12.7, 12.5, 12.5, 12.5, 12.5, 12.5, 12.5, 12.3,
     12.0, 11.4, 10.6,  9.6,  8.6,  7.5,  6.6,  6.0,  5.7,  5.6,
      5.7,  5.9,  6.2,  6.5,  6.8,  7.1,  7.3,  7.5,  7.7,  7.8,
      7.9,  7.5,  6.4,  5.4,  2.9,  1.6, -1.0, -2.7, -3.6, -4.7,
     -5.4, -5.2, -5.5, -5.6, -5.8, -5.9, -6.2, -6.4, -6.1, -4.7,
     -2.7,  0.0,  2.6,  5.4,  7.7, 10.5, 13.4, 16.0, 18.2, 20.2,
     21.2, 22.4, 23.5, 23.9, 24.3, 24.0, 23.9, 23.9, 23.7, 24.0,
     24.3, 25.3, 26.2, 27.3, 28.2, 29.1, 30.0, 30.7, 31.4, 32.2,
     33.1, 34.0, 35.0, 36.5, 38.3, 40.2, 42.2, 44.5, 46.5, 48.5,
     50.5, 52.2, 53.8, 54.9, 55.8, 56.9, 58.3,
);

/// Annual ΔT values (seconds) from IERS/USNO observations, 1992.0–2025.0.
/// Index 0 = year 1992, index 33 = year 2025.
/// Source: IERS Bulletin A, USNO finals2000A data.
const OBSERVED_TERMS: usize = 34;
const OBSERVED_START_YEAR: f64 = 1992.0;

#[rustfmt::skip]
const OBSERVED_DT: [Seconds; OBSERVED_TERMS] = qtty::qtty_vec!(
    Seconds;
    // 1992  1993   1994   1995   1996   1997   1998   1999
    58.31, 59.12, 59.98, 60.78, 61.63, 62.30, 62.97, 63.47,
    // 2000  2001   2002   2003   2004   2005   2006   2007
    63.83, 64.09, 64.30, 64.47, 64.57, 64.69, 64.85, 65.15,
    // 2008  2009   2010   2011   2012   2013   2014   2015
    65.46, 65.78, 66.07, 66.32, 66.60, 66.91, 67.28, 67.64,
    // 2016  2017   2018   2019   2020   2021   2022   2023
    68.10, 68.59, 68.97, 69.22, 69.36, 69.36, 69.29, 69.18,
    // 2024  2025
    69.09, 69.36,
);

/// The year after the last observed data point. Beyond this we extrapolate.
const OBSERVED_END_YEAR: f64 = OBSERVED_START_YEAR + OBSERVED_TERMS as f64;

/// Last observed ΔT rate (seconds/year). Computed from the last 5 years of
/// observed data. The rate has been nearly flat 2019–2025 (~+0.02 s/yr).
const EXTRAPOLATION_RATE: f64 = 0.02;

// ------------------------------------------------------------------------------------
// ΔT sections by time interval
// ------------------------------------------------------------------------------------

#[inline]
fn delta_t_ancient(jd: Days) -> Seconds {
    const DT_A0_S: Seconds = Seconds::new(1_830.0);
    const DT_A1_S: Seconds = Seconds::new(-405.0);
    const DT_A2_S: Seconds = Seconds::new(46.5);
    const JD_EPOCH_948: Days = Days::new(2_067_314.5);
    let c = days_ratio(jd - JD_EPOCH_948, JULIAN_CENTURY);
    DT_A0_S + DT_A1_S * c + DT_A2_S * c * c
}

#[inline]
fn delta_t_medieval(jd: Days) -> Seconds {
    const JD_EPOCH_1850: Days = Days::new(2_396_758.5);
    const DT_A2_S: Seconds = Seconds::new(22.5);
    let c = days_ratio(jd - JD_EPOCH_1850, JULIAN_CENTURY);
    DT_A2_S * c * c
}

/// Three-point interpolation in the biennial table, centred on the nearest node.
#[inline]
fn delta_t_table(jd: Days) -> Seconds {
    const JD_TABLE_START_1620: Days = Days::new(2_312_752.5);
    const BIENNIAL_STEP_D: Days = Days::new(730.5);

    let ratio = days_ratio(jd - JD_TABLE_START_1620, BIENNIAL_STEP_D);
    let i = (ratio.round().max(1.0) as usize).min(TERMS - 2);
    let a: Seconds = DELTA_T[i] - DELTA_T[i - 1];
    let b: Seconds = DELTA_T[i + 1] - DELTA_T[i];
    let c: Seconds = b - a;
    let n = ratio - i as f64;
    DELTA_T[i] + n / 2.0 * (a + b + n * c)
}

#[inline]
fn fractional_year(jd: Days) -> f64 {
    2000.0 + (jd.value() - JD_J2000) / 365.25
}

#[inline]
fn delta_t_observed(jd: Days) -> Seconds {
    let idx_f = fractional_year(jd) - OBSERVED_START_YEAR;
    let idx = idx_f as usize;
    if idx + 1 >= OBSERVED_TERMS {
        return OBSERVED_DT[OBSERVED_TERMS - 1];
    }
    let frac = idx_f - idx as f64;
    OBSERVED_DT[idx] + frac * (OBSERVED_DT[idx + 1] - OBSERVED_DT[idx])
}

#[inline]
fn delta_t_extrapolated(jd: Days) -> Seconds {
    let years_past = fractional_year(jd) - OBSERVED_END_YEAR;
    OBSERVED_DT[OBSERVED_TERMS - 1] + Seconds::new(EXTRAPOLATION_RATE * years_past)
}

#[inline]
fn days_ratio(num: Days, den: Days) -> f64 {
    (num / den).simplify().value()
}

/// JD boundary: start of year 1992.0
const JD_1992: Days = Days::new(2_448_622.5);

/// JD boundary: start of year 2026.0
const JD_2026: Days = Days::new(2_461_041.5);

/// ΔT in seconds for a Julian Day on the UT axis.
pub(crate) fn delta_t_from_jd(jd: Days) -> Seconds {
    match jd {
        jd if jd < Days::new(2_067_314.5) => delta_t_ancient(jd),
        jd if jd < Days::new(2_305_447.5) => delta_t_medieval(jd),
        jd if jd < JD_1992 => delta_t_table(jd),
        jd if jd < JD_2026 => delta_t_observed(jd),
        _ => delta_t_extrapolated(jd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i64, m: u8, d: u8) -> Seconds {
        PiecewiseDeltaT.delta_t(CivilDate::new(y, m, d).unwrap())
    }

    #[test]
    fn ancient_sample() {
        let v = dt(500, 1, 1);
        assert!((v - Seconds::new(4_577.696_095_312)).abs() < Seconds::new(1e-6), "ΔT(500) = {v}");
    }

    #[test]
    fn medieval_sample() {
        let v = dt(1200, 1, 1);
        assert!((v - Seconds::new(950.588_963_380_5)).abs() < Seconds::new(1e-6), "ΔT(1200) = {v}");
    }

    #[test]
    fn table_start() {
        // 1620-01-01 is JD 2 312 752.5, the first table node.
        let v = dt(1620, 1, 1);
        assert!((v - Seconds::new(124.0)).abs() < Seconds::new(1e-6), "ΔT(1620) = {v}");
    }

    #[test]
    fn table_nodes_are_exact() {
        // Node 176 is 1972.0 on the biennial grid.
        let v = delta_t_table(Days::new(2_312_752.5 + 176.0 * 730.5));
        assert!((v - Seconds::new(42.2)).abs() < Seconds::new(1e-6), "ΔT(node 176) = {v}");
        // Node 185, the last one with a right neighbour.
        let v = delta_t_table(Days::new(2_312_752.5 + 185.0 * 730.5));
        assert!((v - Seconds::new(56.9)).abs() < Seconds::new(1e-6), "ΔT(node 185) = {v}");
    }

    #[test]
    fn table_reaches_1972_smoothly() {
        let v = dt(1972, 1, 1);
        assert!((v - Seconds::new(42.2)).abs() < Seconds::new(0.05), "ΔT(1972) = {v}");
        let before = dt(1971, 12, 31);
        assert!(before <= v && v - before < Seconds::new(0.01));
    }

    #[test]
    fn observed_2000_and_2020() {
        let v = dt(2000, 1, 1);
        assert!((v - Seconds::new(63.83)).abs() < Seconds::new(0.1), "ΔT(2000) = {v}");
        let v = dt(2020, 1, 1);
        assert!((v - Seconds::new(69.36)).abs() < Seconds::new(0.5), "ΔT(2020) = {v}");
    }

    #[test]
    fn extrapolated_near_future() {
        let v = dt(2030, 1, 1);
        assert!((v - Seconds::new(69.44)).abs() < Seconds::new(1.0), "ΔT(2030) = {v}");
        assert!(v < Seconds::new(75.0));
    }

    #[test]
    fn extreme_years_stay_finite() {
        let v = dt(crate::calendar::MIN_YEAR, 1, 1);
        assert!(v.value().is_finite() && v > Seconds::new(0.0));
    }
}
