//! # Frame Codec
//!
//! Field elements live in module memory as frames:
//!
//! ```text
//! offset+0  [short value : u32 LE]
//! offset+4  [flags       : u32 LE]   bit 31 = long, bit 30 = Montgomery
//! offset+8  [payload     : n32 bytes LE]   (long frames only)
//! ```
//!
//! Short frames carry the value in the first word; a set sign bit marks a
//! negative surrogate `v - p + 2^32`. Long frames carry the magnitude in the
//! payload, optionally in Montgomery form.

use crate::error::{Result, WitcalcError};
use crate::field::{Encoding, FieldParams};
use crate::{FRAME_HEADER_LEN, LONG_FLAG, MONTGOMERY_FLAG, SHORT_MAX};
use num_bigint::BigUint;

// ============================================================================
// Raw magnitudes
// ============================================================================

/// Read a bare little-endian magnitude (no frame header)
pub fn load_raw(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_le(bytes)
}

/// Write a bare little-endian magnitude, zero-filling the rest of `dst`
pub fn store_raw(dst: &mut [u8], value: &BigUint) -> Result<()> {
    let bytes = value.to_bytes_le();
    if bytes.len() > dst.len() {
        return Err(WitcalcError::ValueOutOfRange {
            branch: "raw",
            value: value.to_string(),
        });
    }
    let (head, tail) = dst.split_at_mut(bytes.len());
    head.copy_from_slice(&bytes);
    tail.fill(0);
    Ok(())
}

// ============================================================================
// Frames
// ============================================================================

#[inline]
fn read_word(frame: &[u8], at: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&frame[at..at + 4]);
    u32::from_le_bytes(word)
}

#[inline]
fn write_word(frame: &mut [u8], at: usize, value: u32) {
    frame[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn ensure_len(frame_len: usize, expected: usize) -> Result<()> {
    if frame_len < expected {
        return Err(WitcalcError::FrameTooShort {
            expected,
            found: frame_len,
        });
    }
    Ok(())
}

/// Encode a residue into `frame`, returning the branch taken
///
/// `value` must already be reduced modulo the prime.
pub fn encode(params: &FieldParams, frame: &mut [u8], value: &BigUint) -> Result<Encoding> {
    let encoding = params.classify(value)?;
    match encoding {
        Encoding::ShortPositive(v) | Encoding::ShortNegative(v) => {
            ensure_len(frame.len(), FRAME_HEADER_LEN)?;
            write_word(frame, 0, v);
            write_word(frame, 4, 0);
        }
        Encoding::Long => {
            ensure_len(frame.len(), params.element_len())?;
            write_word(frame, 0, 0);
            write_word(frame, 4, LONG_FLAG);
            store_raw(&mut frame[FRAME_HEADER_LEN..params.element_len()], value)?;
        }
    }
    Ok(encoding)
}

/// Decode the frame at the start of `frame` into a plain residue
pub fn decode(params: &FieldParams, frame: &[u8]) -> Result<BigUint> {
    ensure_len(frame.len(), FRAME_HEADER_LEN)?;
    let flags = read_word(frame, 4);

    if flags & LONG_FLAG != 0 {
        ensure_len(frame.len(), params.element_len())?;
        let raw = load_raw(&frame[FRAME_HEADER_LEN..params.element_len()]);
        if flags & MONTGOMERY_FLAG != 0 {
            Ok(params.from_montgomery(&raw))
        } else {
            Ok(raw)
        }
    } else {
        let short = read_word(frame, 0);
        if short & SHORT_MAX != 0 {
            // v - max + (p - max)
            Ok(params.short_min() + BigUint::from(short - SHORT_MAX))
        } else {
            Ok(BigUint::from(short))
        }
    }
}
