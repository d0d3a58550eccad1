// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! Compact binary wire form of [`UniversalInstant`].
//!
//! | Bytes | Content |
//! |-------|---------|
//! | 0 | header: type tag (high nibble), flags (low nibble) |
//! | 1–8 | POSIX seconds, signed big endian |
//! | 9–12 | nanosecond fraction, big endian; only if the fraction flag is set |
//!
//! Header flags: bit 0 marks a positive leap second, bit 1 a non-zero
//! fraction.  A decoded leap flag must be confirmed by the local leap table,
//! so producer and consumer with different tables fail loudly instead of
//! disagreeing silently.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::warn;

use crate::context::TimeContext;
use crate::error::{InstantError, InstantResult};
use crate::instant::UniversalInstant;

/// Type tag stored in the high nibble of the header.
pub const INSTANT_TAG: u8 = 4;

const LEAP_FLAG: u8 = 0b0000_0001;
const FRACTION_FLAG: u8 = 0b0000_0010;
const KNOWN_FLAGS: u8 = LEAP_FLAG | FRACTION_FLAG;

const POSIX_LEN: usize = 8;
const FRACTION_LEN: usize = 4;

/// Encoder and decoder of the instant wire form.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct InstantCodec;

impl InstantCodec {
    /// Bytes needed for `instant`: 9 or 13.
    #[inline]
    pub fn encoded_len(instant: &UniversalInstant) -> usize {
        1 + POSIX_LEN
            + if instant.nanosecond() > 0 {
                FRACTION_LEN
            } else {
                0
            }
    }

    /// Appends the wire form of `instant` to `buf`.
    pub fn encode<B: BufMut>(instant: &UniversalInstant, buf: &mut B) {
        let mut header = INSTANT_TAG << 4;
        if instant.is_leap_second() {
            header |= LEAP_FLAG;
        }
        let fraction = instant.nanosecond();
        if fraction > 0 {
            header |= FRACTION_FLAG;
        }
        buf.put_u8(header);
        buf.put_i64(instant.posix_seconds());
        if fraction > 0 {
            buf.put_u32(fraction);
        }
    }

    /// Wire form of `instant` as an owned buffer.
    pub fn to_bytes(instant: &UniversalInstant) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::encoded_len(instant));
        Self::encode(instant, &mut buf);
        buf.freeze()
    }

    /// Reads one instant from the front of `buf`.
    pub fn decode<B: Buf>(buf: &mut B, ctx: &TimeContext) -> InstantResult<UniversalInstant> {
        if !buf.has_remaining() {
            return Err(InstantError::InvalidEncoding("empty input".into()));
        }
        let header = buf.get_u8();
        if header >> 4 != INSTANT_TAG {
            return Err(InstantError::InvalidEncoding(format!(
                "unexpected type tag {}",
                header >> 4
            )));
        }
        let flags = header & 0x0F;
        if flags & !KNOWN_FLAGS != 0 {
            return Err(InstantError::InvalidEncoding(format!(
                "unknown header flags {flags:#06b}"
            )));
        }
        let leap = flags & LEAP_FLAG != 0;
        let has_fraction = flags & FRACTION_FLAG != 0;

        let needed = POSIX_LEN + if has_fraction { FRACTION_LEN } else { 0 };
        if buf.remaining() < needed {
            return Err(InstantError::InvalidEncoding(format!(
                "truncated instant: need {needed} bytes, have {}",
                buf.remaining()
            )));
        }
        let posix = buf.get_i64();
        let nanos = if has_fraction { buf.get_u32() } else { 0 };
        if has_fraction && nanos == 0 {
            return Err(InstantError::InvalidEncoding(
                "fraction flag set on a zero fraction".into(),
            ));
        }

        let instant = UniversalInstant::of_posix(posix, nanos)
            .map_err(|err| InstantError::InvalidEncoding(err.to_string()))?;
        if !leap {
            return Ok(instant);
        }
        let limits = [
            0,
            UniversalInstant::MIN.posix_seconds(),
            UniversalInstant::MAX.posix_seconds(),
        ];
        if limits.contains(&posix) {
            return Err(InstantError::InvalidEncoding(format!(
                "{instant} cannot be a leap second"
            )));
        }
        instant.with_leap_flag(ctx).inspect_err(|err| {
            warn!(posix, %err, "decoded leap second rejected by local table");
        })
    }

    /// Decodes a complete buffer; trailing bytes are an error.
    pub fn from_slice(mut bytes: &[u8], ctx: &TimeContext) -> InstantResult<UniversalInstant> {
        let instant = Self::decode(&mut bytes, ctx)?;
        if bytes.has_remaining() {
            return Err(InstantError::InvalidEncoding(format!(
                "{} trailing bytes",
                bytes.remaining()
            )));
        }
        Ok(instant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::leap::LeapSecondTable;
    use crate::scales::TimeScale;

    fn ctx() -> TimeContext {
        TimeContext::default()
    }

    #[test]
    fn layout_of_plain_and_fractional_instants() {
        let epoch = InstantCodec::to_bytes(&UniversalInstant::UNIX_EPOCH);
        assert_eq!(&epoch[..], &[0x40, 0, 0, 0, 0, 0, 0, 0, 0]);

        let m = UniversalInstant::of_posix(-2, 5).unwrap();
        let bytes = InstantCodec::to_bytes(&m);
        assert_eq!(bytes.len(), InstantCodec::encoded_len(&m));
        assert_eq!(bytes[0], 0x42);
        assert_eq!(&bytes[1..9], &(-2i64).to_be_bytes());
        assert_eq!(&bytes[9..], &5u32.to_be_bytes());
    }

    #[test]
    fn limits_and_leap_second_survive() {
        let ctx = ctx();
        let leap = UniversalInstant::of(1_278_028_824, 250, TimeScale::Utc, &ctx).unwrap();
        for m in [
            UniversalInstant::MIN,
            UniversalInstant::MAX,
            UniversalInstant::UNIX_EPOCH,
            leap,
        ] {
            let bytes = InstantCodec::to_bytes(&m);
            assert_eq!(InstantCodec::from_slice(&bytes, &ctx).unwrap(), m);
        }
        assert_eq!(InstantCodec::to_bytes(&leap)[0], 0x43);
    }

    #[test]
    fn unregistered_leap_flag_is_rejected() {
        let ctx = ctx();
        // 2013-06-30T23:59:59Z flagged as leap second.
        let mut raw = vec![0x41];
        raw.extend_from_slice(&1_372_636_799i64.to_be_bytes());
        let err = InstantCodec::from_slice(&raw, &ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LeapSecondState);
        assert!(err.to_string().contains("2013-06-30"));

        let leap = UniversalInstant::of(1_278_028_824, 0, TimeScale::Utc, &ctx).unwrap();
        let bytes = InstantCodec::to_bytes(&leap);
        let old = TimeContext::default().with_leap_seconds(LeapSecondTable::empty());
        assert!(matches!(
            InstantCodec::from_slice(&bytes, &old),
            Err(InstantError::UnregisteredLeapSecond { .. })
        ));
        let off = TimeContext::default().with_leap_seconds(LeapSecondTable::iers().suppressed());
        assert!(InstantCodec::from_slice(&bytes, &off).is_err());
    }

    #[test]
    fn malformed_input() {
        let ctx = ctx();
        let bad = |raw: &[u8]| InstantCodec::from_slice(raw, &ctx).unwrap_err().kind();
        assert_eq!(bad(&[]), ErrorKind::DataIntegrity);
        assert_eq!(bad(&[0x50, 0, 0, 0, 0, 0, 0, 0, 0]), ErrorKind::DataIntegrity);
        assert_eq!(bad(&[0x44, 0, 0, 0, 0, 0, 0, 0, 0]), ErrorKind::DataIntegrity);
        assert_eq!(bad(&[0x42, 0, 0, 0, 0, 0, 0, 0, 0]), ErrorKind::DataIntegrity);
        assert_eq!(bad(&[0x40, 0, 0, 0, 0, 0, 0, 0, 0, 7]), ErrorKind::DataIntegrity);
        // Leap flag on the epoch.
        assert_eq!(bad(&[0x41, 0, 0, 0, 0, 0, 0, 0, 0]), ErrorKind::DataIntegrity);
        // Fraction out of range.
        let mut raw = vec![0x42];
        raw.extend_from_slice(&0i64.to_be_bytes());
        raw.extend_from_slice(&1_000_000_000u32.to_be_bytes());
        assert_eq!(bad(&raw), ErrorKind::DataIntegrity);
    }

    #[test]
    fn zero_fraction_has_a_single_encoding() {
        let ctx = ctx();
        let mut padded = vec![0x42];
        padded.extend_from_slice(&7i64.to_be_bytes());
        padded.extend_from_slice(&0u32.to_be_bytes());
        let err = InstantCodec::from_slice(&padded, &ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataIntegrity);

        let m = UniversalInstant::of_posix(7, 0).unwrap();
        let bytes = InstantCodec::to_bytes(&m);
        assert_eq!(bytes.len(), 9);
        assert_eq!(InstantCodec::from_slice(&bytes, &ctx).unwrap(), m);
    }

    #[test]
    fn decodes_a_stream() {
        let ctx = ctx();
        let a = UniversalInstant::of_posix(1, 0).unwrap();
        let b = UniversalInstant::of_posix(2, 3).unwrap();
        let mut buf = BytesMut::new();
        InstantCodec::encode(&a, &mut buf);
        InstantCodec::encode(&b, &mut buf);
        let mut bytes = buf.freeze();
        assert_eq!(InstantCodec::decode(&mut bytes, &ctx).unwrap(), a);
        assert_eq!(InstantCodec::decode(&mut bytes, &ctx).unwrap(), b);
        assert!(!bytes.has_remaining());
    }
}
