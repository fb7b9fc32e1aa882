//! Signal-name hashing
//!
//! Modules look signals up by the 64-bit FNV-1a hash of their name,
//! passed as two 32-bit halves.

use fnv::FnvHasher;
use std::fmt;
use std::hash::Hasher;

/// FNV-1a hash of a signal name, split for the module ABI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalHash {
    pub msb: u32,
    pub lsb: u32,
}

impl SignalHash {
    pub fn of(name: &str) -> Self {
        let mut hasher = FnvHasher::default();
        hasher.write(name.as_bytes());
        Self::from_u64(hasher.finish())
    }

    #[inline]
    pub const fn from_u64(hash: u64) -> Self {
        Self {
            msb: (hash >> 32) as u32,
            lsb: hash as u32,
        }
    }

    #[inline]
    pub const fn to_u64(self) -> u64 {
        ((self.msb as u64) << 32) | self.lsb as u64
    }

    /// Halves reinterpreted as the i32 arguments the module takes
    #[inline]
    pub const fn as_args(self) -> (i32, i32) {
        (self.msb as i32, self.lsb as i32)
    }
}

impl fmt::Display for SignalHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}{:08x}", self.msb, self.lsb)
    }
}
