//! # Error Types for the Witness Calculator Data Model

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WitcalcError {
    // Field parameter errors
    #[error("Invalid prime: {0} (must exceed 2^32)")]
    InvalidPrime(String),

    #[error("Invalid frame width: {n32} bytes cannot hold a {bits}-bit prime")]
    InvalidFrameWidth { n32: usize, bits: u64 },

    #[error("Invalid frame length: {0} bytes (header alone is 8)")]
    InvalidFrameLen(i32),

    #[error("Montgomery radix is not invertible modulo {0}")]
    NotInvertible(String),

    // Codec errors
    #[error("Value out of range for {branch} encoding: {value}")]
    ValueOutOfRange { branch: &'static str, value: String },

    #[error("Frame too short: expected {expected} bytes, found {found} bytes")]
    FrameTooShort { expected: usize, found: usize },

    // Input errors
    #[error("Invalid input '{name}': {source}")]
    InvalidInput {
        name: String,
        #[source]
        source: InputError,
    },

    #[error("Invalid input document: {0}")]
    InvalidDocument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure while normalizing a single input value tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("not an integer literal: {0:?}")]
    BadLiteral(String),

    #[error("number {0} cannot be represented as an integer")]
    BadNumber(String),

    #[error("unsupported JSON type: {0}")]
    UnsupportedType(&'static str),

    #[error("at index {index}: {source}")]
    AtIndex {
        index: usize,
        #[source]
        source: Box<InputError>,
    },
}

impl WitcalcError {
    /// Name of the offending input, if this error came from the input document
    pub fn input_name(&self) -> Option<&str> {
        match self {
            WitcalcError::InvalidInput { name, .. } => Some(name),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, WitcalcError>;
