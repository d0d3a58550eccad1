// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! Error types for instant construction, conversion and arithmetic.
//!
//! Every fallible operation returns [`InstantResult<T>`].  The variants are
//! grouped into a small taxonomy exposed through [`InstantError::kind`]:
//!
//! | Kind | Typical cause |
//! |------|---------------|
//! | [`ErrorKind::DomainRange`] | value outside the supported range, TAI before 1958, GPS before 1980 |
//! | [`ErrorKind::LeapSecondState`] | non-POSIX scale with leap seconds suppressed, leap flag unknown to the local table |
//! | [`ErrorKind::AmbiguousLeapAdjustment`] | leap second edited under a zone offset that is not whole minutes |
//! | [`ErrorKind::ArithmeticOverflow`] | 64-bit second counter overflow |
//! | [`ErrorKind::DataIntegrity`] | malformed wire bytes, leap table or configuration |
//! | [`ErrorKind::Internal`] | registry returned an impossible leap shift |
//!
//! Failures never yield a partially built instant: instants are immutable
//! values and an `Err` carries no instant at all.

use std::path::PathBuf;

use thiserror::Error;

use crate::calendar::CivilDate;
use crate::scales::TimeScale;
use crate::zone::ZoneOffset;

/// Coarse classification of an [`InstantError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Instant or scale value outside the supported range.
    DomainRange,
    /// Leap-second configuration does not allow the operation.
    LeapSecondState,
    /// Leap second under a zone offset that is not a whole number of minutes.
    AmbiguousLeapAdjustment,
    /// Overflow of the 64-bit second counter.
    ArithmeticOverflow,
    /// Malformed external data (wire bytes, leap table, configuration).
    DataIntegrity,
    /// Broken invariant inside a collaborator.
    Internal,
}

/// Unified error type of the crate.
#[derive(Error, Debug)]
pub enum InstantError {
    /// Nanosecond argument not in `0..1_000_000_000`.
    #[error("nanosecond out of range: {0}")]
    NanosecondOutOfRange(i64),

    /// POSIX seconds outside the proleptic-Gregorian years ±999,999,999.
    #[error("POSIX time out of supported range: {0}")]
    OutOfRange(i64),

    /// Value lies before the epoch of a continuous scale.
    #[error("{scale} not supported before {epoch}: {value}")]
    BeforeScaleEpoch {
        scale: TimeScale,
        epoch: &'static str,
        value: i64,
    },

    /// SI arithmetic requested on or across a pre-1972 instant.
    #[error("cannot calculate SI-duration before 1972-01-01")]
    Before1972,

    /// A field value is not valid for the edited local timestamp.
    #[error("invalid value {value} for {field}")]
    InvalidFieldValue { field: &'static str, value: i64 },

    /// Second 60 requested where no positive leap second is registered.
    #[error("leap second invalid in context: {0}")]
    LeapSecondInvalidInContext(String),

    /// Non-POSIX scale requested while leap seconds are suppressed.
    #[error("leap seconds are not supported by configuration (scale {scale})")]
    LeapSecondsDisabled { scale: TimeScale },

    /// Decoded leap flag not backed by the local leap table.
    #[error(
        "not registered as leap second event: {date} \
         [check the leap second tables of both producer and consumer]"
    )]
    UnregisteredLeapSecond { date: CivilDate },

    /// Local timestamp falls on a second removed by a negative leap event.
    #[error("illegal local timestamp due to negative leap second: {0}")]
    NegativeLeapSecond(String),

    /// Leap second edited under a zone offset that is not whole minutes.
    #[error("leap second can only be adjusted with a zone offset in full minutes: {offset}")]
    AmbiguousLeapAdjustment { offset: ZoneOffset },

    /// 64-bit overflow or a result beyond the time axis.
    #[error("arithmetic overflow in {operation}")]
    ArithmeticOverflow { operation: &'static str },

    /// Wire bytes do not form a valid instant.
    #[error("invalid instant encoding: {0}")]
    InvalidEncoding(String),

    /// Leap table text or event list is malformed.
    #[error("invalid leap second table (line {line}): {reason}")]
    InvalidLeapTable { line: usize, reason: String },

    /// Configuration value could not be used.
    #[error("configuration error: {0}")]
    Config(String),

    /// Leap table file could not be read.
    #[error("cannot read leap second table {path:?}: {source}")]
    LeapTableIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Registry produced a residual other than 0 or 1 while stripping.
    #[error("cannot handle leap shift of {elapsed} (residual {residual})")]
    InconsistentLeapShift { elapsed: i64, residual: i64 },
}

/// Result alias used throughout the crate.
pub type InstantResult<T> = Result<T, InstantError>;

impl InstantError {
    /// Taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            InstantError::NanosecondOutOfRange(_)
            | InstantError::OutOfRange(_)
            | InstantError::BeforeScaleEpoch { .. }
            | InstantError::Before1972
            | InstantError::InvalidFieldValue { .. }
            | InstantError::LeapSecondInvalidInContext(_) => ErrorKind::DomainRange,
            InstantError::LeapSecondsDisabled { .. }
            | InstantError::UnregisteredLeapSecond { .. }
            | InstantError::NegativeLeapSecond(_) => ErrorKind::LeapSecondState,
            InstantError::AmbiguousLeapAdjustment { .. } => ErrorKind::AmbiguousLeapAdjustment,
            InstantError::ArithmeticOverflow { .. } => ErrorKind::ArithmeticOverflow,
            InstantError::InvalidEncoding(_)
            | InstantError::InvalidLeapTable { .. }
            | InstantError::Config(_)
            | InstantError::LeapTableIo { .. } => ErrorKind::DataIntegrity,
            InstantError::InconsistentLeapShift { .. } => ErrorKind::Internal,
        }
    }

    pub(crate) fn overflow(operation: &'static str) -> Self {
        InstantError::ArithmeticOverflow { operation }
    }
}
