//! # Circom Witness Calculator Specification
//!
//! Data model shared by the witness driver and its module backends.
//!
//! ## Key Features
//! - Field parameters derived from the circuit prime (Montgomery radix, short-value window)
//! - Frame codec for the module's compact field-element layout (short, short-negative, long)
//! - FNV-1a signal-name hashing, split into the 32-bit halves the module ABI expects
//! - Input tree normalizer for JSON documents (decimal/hex strings, numbers, nested arrays)
//! - Witness vector with decimal-string serialization

pub mod abi;
pub mod codec;
pub mod error;
pub mod field;
pub mod input;
pub mod signal;
pub mod witness;

pub use codec::{decode, encode, load_raw, store_raw};
pub use error::{InputError, WitcalcError};
pub use field::{Encoding, FieldParams};
pub use input::{parse_inputs, parse_integer_literal, InputValue, Inputs};
pub use signal::SignalHash;
pub use witness::Witness;

/// Upper bound (exclusive) of the short positive window: 2^31
pub const SHORT_MAX: u32 = 0x8000_0000;

/// Flag word bit marking a long-form frame
pub const LONG_FLAG: u32 = 0x8000_0000;

/// Flag word bit marking a long-form frame stored in Montgomery form
pub const MONTGOMERY_FLAG: u32 = 0x4000_0000;

/// Frame header: 4-byte short value followed by the 4-byte flag word
pub const FRAME_HEADER_LEN: usize = 8;

/// Size of a scratch integer cell
pub const INT_CELL_LEN: u32 = 8;

/// Byte offset of the bump allocator's free pointer in linear memory
pub const FREE_POINTER_OFFSET: u32 = 0;

/// The top-level component index; the only one this driver addresses
pub const MAIN_COMPONENT: i32 = 0;
