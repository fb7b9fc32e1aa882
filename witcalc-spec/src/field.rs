//! # Field Parameters
//!
//! Everything the codec needs to know about the circuit's prime field,
//! derived once from the prime and the module's frame width:
//!
//! - `n32`: byte width of a long-form payload (`getFrLen() - 8`)
//! - `n64`: number of 64-bit words spanned by the prime
//! - `r = 2^(64 * n64)`: Montgomery radix, and `r_inv = r^-1 mod p`
//! - `short_max = 2^31`, `short_min = p - 2^31`: the short-value window
//!
//! Values below `short_max` encode as short positives, values at or above
//! `short_min` as short negatives, and everything in between as long frames.

use crate::error::{Result, WitcalcError};
use crate::{FRAME_HEADER_LEN, SHORT_MAX};
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, ToPrimitive};
use std::fmt;

/// How a residue is laid out in a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `0 <= v < 2^31`, stored as-is in the short word
    ShortPositive(u32),
    /// `p - 2^31 <= v < p`, stored as `v - p + 2^32` in the short word
    ShortNegative(u32),
    /// Everything else: flag word `0x80000000`, magnitude in the payload
    Long,
}

impl Encoding {
    /// Human-readable branch name, used in error messages
    pub const fn branch(self) -> &'static str {
        match self {
            Encoding::ShortPositive(_) => "short positive",
            Encoding::ShortNegative(_) => "short negative",
            Encoding::Long => "long",
        }
    }
}

/// Immutable parameter set of one circuit's field
#[derive(Clone, PartialEq, Eq)]
pub struct FieldParams {
    prime: BigUint,
    n32: usize,
    n64: u32,
    r: BigUint,
    r_inv: BigUint,
    short_max: BigUint,
    short_min: BigUint,
}

impl FieldParams {
    /// Derive the parameter set from a prime and a payload width in bytes
    pub fn new(prime: BigUint, n32: usize) -> Result<Self> {
        let short_max = BigUint::from(SHORT_MAX);
        // The short windows [0, 2^31) and [p - 2^31, p) must not overlap
        if prime.bits() <= 32 {
            return Err(WitcalcError::InvalidPrime(prime.to_string()));
        }

        let bits = prime.bits();
        if (n32 as u64) * 8 < bits {
            return Err(WitcalcError::InvalidFrameWidth { n32, bits });
        }

        let n64 = ((bits - 1) / 64 + 1) as u32;
        let r = BigUint::one() << (64 * n64 as usize);
        let r_inv = r
            .modinv(&prime)
            .ok_or_else(|| WitcalcError::NotInvertible(prime.to_string()))?;
        let short_min = &prime - &short_max;

        Ok(Self {
            prime,
            n32,
            n64,
            r,
            r_inv,
            short_max,
            short_min,
        })
    }

    /// Payload width from the module's reported frame length (`getFrLen`)
    pub fn n32_from_frame_len(fr_len: i32) -> Result<usize> {
        let n32 = fr_len - FRAME_HEADER_LEN as i32;
        if n32 <= 0 {
            return Err(WitcalcError::InvalidFrameLen(fr_len));
        }
        Ok(n32 as usize)
    }

    #[inline]
    pub fn prime(&self) -> &BigUint {
        &self.prime
    }

    /// Byte width of a long-form payload
    #[inline]
    pub fn n32(&self) -> usize {
        self.n32
    }

    /// Number of 64-bit words spanned by the prime
    #[inline]
    pub fn n64(&self) -> u32 {
        self.n64
    }

    /// Montgomery radix `2^(64 * n64)`
    #[inline]
    pub fn r(&self) -> &BigUint {
        &self.r
    }

    /// `r^-1 mod p`
    #[inline]
    pub fn r_inv(&self) -> &BigUint {
        &self.r_inv
    }

    #[inline]
    pub fn short_max(&self) -> &BigUint {
        &self.short_max
    }

    #[inline]
    pub fn short_min(&self) -> &BigUint {
        &self.short_min
    }

    /// Bytes reserved for one scratch field element: `8 + 4 * n32`
    #[inline]
    pub fn frame_len(&self) -> usize {
        FRAME_HEADER_LEN + 4 * self.n32
    }

    /// Native element length as the module lays it out: `8 + n32`
    #[inline]
    pub fn element_len(&self) -> usize {
        FRAME_HEADER_LEN + self.n32
    }

    /// Pick the encoding branch for a residue
    ///
    /// Fails if `value` is not reduced modulo the prime.
    pub fn classify(&self, value: &BigUint) -> Result<Encoding> {
        if value >= &self.prime {
            return Err(WitcalcError::ValueOutOfRange {
                branch: "field",
                value: value.to_string(),
            });
        }

        if value < &self.short_max {
            let v = value.to_u32().ok_or_else(|| out_of_range("short positive", value))?;
            Ok(Encoding::ShortPositive(v))
        } else if value >= &self.short_min {
            // max + (v - (p - max)), lands in [2^31, 2^32)
            let v_neg = &self.short_max + (value - &self.short_min);
            let v = v_neg
                .to_u32()
                .filter(|v| *v >= SHORT_MAX)
                .ok_or_else(|| out_of_range("short negative", value))?;
            Ok(Encoding::ShortNegative(v))
        } else {
            Ok(Encoding::Long)
        }
    }

    /// Reduce a signed integer into `[0, p)`
    pub fn reduce(&self, value: &BigInt) -> BigUint {
        let p = BigInt::from(self.prime.clone());
        // mod_floor is non-negative for a positive modulus
        value.mod_floor(&p).magnitude().clone()
    }

    /// `v * r^-1 mod p`
    pub fn from_montgomery(&self, value: &BigUint) -> BigUint {
        (value * &self.r_inv) % &self.prime
    }

    /// `v * r mod p`
    pub fn to_montgomery(&self, value: &BigUint) -> BigUint {
        (value * &self.r) % &self.prime
    }
}

fn out_of_range(branch: &'static str, value: &BigUint) -> WitcalcError {
    WitcalcError::ValueOutOfRange {
        branch,
        value: value.to_string(),
    }
}

impl fmt::Debug for FieldParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldParams")
            .field("prime", &self.prime.to_string())
            .field("n32", &self.n32)
            .field("n64", &self.n64)
            .finish_non_exhaustive()
    }
}
