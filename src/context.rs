// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! Collaborator bundle and configuration.
//!
//! Every operation that needs leap-second data, ΔT or the civil calendar
//! receives a [`TimeContext`] by reference.  A context is built once, is
//! read-only afterwards and is cheap to clone.
//!
//! ```rust
//! use leapmoment::{ContextConfig, LeapSecondMode, TimeContext};
//!
//! let ctx = TimeContext::default();
//! assert!(ctx.leap_seconds().is_enabled());
//!
//! let legacy = ContextConfig {
//!     leap_seconds: LeapSecondMode::Suppressed,
//!     ..ContextConfig::default()
//! }
//! .build()
//! .unwrap();
//! assert!(!legacy.leap_seconds().is_enabled());
//! ```
//!
//! ## Environment
//!
//! | Variable | Values |
//! |----------|--------|
//! | `LEAPMOMENT_LEAP_SECONDS` | `enabled` (default) or `suppressed` |
//! | `LEAPMOMENT_LEAP_TABLE` | path to a leap table in `YYYY-MM-DD, ±1` form |

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use qtty::Seconds;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::calendar::{CivilDate, CivilDateProvider, ProlepticGregorian};
use crate::delta_t::{DeltaTProvider, PiecewiseDeltaT};
use crate::error::{InstantError, InstantResult};
use crate::leap::{LeapSecondRegistry, LeapSecondTable};
use crate::scales::SECONDS_PER_DAY;

/// Environment variable selecting [`LeapSecondMode`].
pub const ENV_LEAP_SECONDS: &str = "LEAPMOMENT_LEAP_SECONDS";

/// Environment variable naming a leap table file.
pub const ENV_LEAP_TABLE: &str = "LEAPMOMENT_LEAP_TABLE";

static GLOBAL: OnceLock<TimeContext> = OnceLock::new();

/// Shared, read-only collaborators of the instant engine.
#[derive(Clone)]
pub struct TimeContext {
    leap: Arc<dyn LeapSecondRegistry>,
    delta_t: Arc<dyn DeltaTProvider>,
    calendar: Arc<dyn CivilDateProvider>,
}

impl TimeContext {
    pub fn new(
        leap: Arc<dyn LeapSecondRegistry>,
        delta_t: Arc<dyn DeltaTProvider>,
        calendar: Arc<dyn CivilDateProvider>,
    ) -> Self {
        Self {
            leap,
            delta_t,
            calendar,
        }
    }

    /// Replaces the leap-second registry.
    pub fn with_leap_seconds<R: LeapSecondRegistry + 'static>(mut self, registry: R) -> Self {
        self.leap = Arc::new(registry);
        self
    }

    /// Replaces the ΔT provider.
    pub fn with_delta_t<D: DeltaTProvider + 'static>(mut self, provider: D) -> Self {
        self.delta_t = Arc::new(provider);
        self
    }

    /// Replaces the calendar provider.
    pub fn with_calendar<C: CivilDateProvider + 'static>(mut self, calendar: C) -> Self {
        self.calendar = Arc::new(calendar);
        self
    }

    #[inline]
    pub fn leap_seconds(&self) -> &dyn LeapSecondRegistry {
        self.leap.as_ref()
    }

    #[inline]
    pub fn delta_t_provider(&self) -> &dyn DeltaTProvider {
        self.delta_t.as_ref()
    }

    #[inline]
    pub fn calendar(&self) -> &dyn CivilDateProvider {
        self.calendar.as_ref()
    }

    /// Process-wide context.
    ///
    /// Built on first use from [`ContextConfig::from_env`] unless a context
    /// was pinned earlier with [`install_global`](Self::install_global).  A
    /// broken environment falls back to the bundled defaults.
    pub fn global() -> &'static TimeContext {
        GLOBAL.get_or_init(|| match ContextConfig::from_env().and_then(|cfg| cfg.build()) {
            Ok(ctx) => ctx,
            Err(err) => {
                error!(%err, "invalid time context configuration, using defaults");
                TimeContext::default()
            }
        })
    }

    /// Pins the process-wide context.  Fails if one is already in place.
    pub fn install_global(ctx: TimeContext) -> InstantResult<()> {
        debug!(enabled = ctx.leap.is_enabled(), "installing global time context");
        GLOBAL
            .set(ctx)
            .map_err(|_| InstantError::Config("global time context already initialised".into()))
    }

    // ── helpers for the engine ──

    /// Calendar date containing the POSIX second `posix`.
    #[inline]
    pub(crate) fn date_of(&self, posix: i64) -> CivilDate {
        self.calendar
            .date_from_posix_day(posix.div_euclid(SECONDS_PER_DAY))
    }

    /// ΔT on the given POSIX day.
    #[inline]
    pub(crate) fn delta_t_on_day(&self, day: i64) -> Seconds {
        self.delta_t
            .delta_t(self.calendar.date_from_posix_day(day))
    }
}

impl Default for TimeContext {
    fn default() -> Self {
        Self::new(
            Arc::new(LeapSecondTable::iers()),
            Arc::new(PiecewiseDeltaT),
            Arc::new(ProlepticGregorian),
        )
    }
}

impl fmt::Debug for TimeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeContext")
            .field("leap", &self.leap)
            .field("delta_t", &self.delta_t)
            .field("calendar", &self.calendar)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Configuration
// ═══════════════════════════════════════════════════════════════════════════

/// Whether leap seconds are honoured.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LeapSecondMode {
    #[default]
    Enabled,
    /// Leap seconds ignored; only the POSIX scale is usable.
    Suppressed,
}

impl FromStr for LeapSecondMode {
    type Err = InstantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enabled" => Ok(LeapSecondMode::Enabled),
            "suppressed" => Ok(LeapSecondMode::Suppressed),
            other => Err(InstantError::Config(format!(
                "{ENV_LEAP_SECONDS} must be `enabled` or `suppressed`, got `{other}`"
            ))),
        }
    }
}

/// Startup configuration of a [`TimeContext`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContextConfig {
    pub leap_seconds: LeapSecondMode,
    /// Leap table file; the bundled IERS table when `None`.
    pub leap_table_path: Option<PathBuf>,
}

impl ContextConfig {
    /// Reads `LEAPMOMENT_LEAP_SECONDS` and `LEAPMOMENT_LEAP_TABLE`.
    pub fn from_env() -> InstantResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> InstantResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let leap_seconds = match lookup(ENV_LEAP_SECONDS) {
            Some(value) => value.parse()?,
            None => LeapSecondMode::default(),
        };
        let leap_table_path = lookup(ENV_LEAP_TABLE)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        Ok(Self {
            leap_seconds,
            leap_table_path,
        })
    }

    /// Loads the leap table and assembles a context with the bundled
    /// ΔT model and calendar.
    pub fn build(&self) -> InstantResult<TimeContext> {
        let table = match &self.leap_table_path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| InstantError::LeapTableIo {
                    path: path.clone(),
                    source,
                })?;
                LeapSecondTable::parse(&text)?
            }
            None => LeapSecondTable::iers(),
        };
        let table = match self.leap_seconds {
            LeapSecondMode::Enabled => table,
            LeapSecondMode::Suppressed => table.suppressed(),
        };
        debug!(
            events = table.len(),
            enabled = table.is_enabled(),
            source = ?self.leap_table_path,
            "leap second table loaded"
        );
        Ok(TimeContext::default().with_leap_seconds(table))
    }
}
