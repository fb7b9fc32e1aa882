//! # Input Normalizer
//!
//! Circuit inputs arrive as a JSON object mapping signal names to values.
//! Each value is a string integer literal, a JSON number, or an arbitrarily
//! nested array of those. Normalization turns that tree into [`InputValue`];
//! flattening visits it depth-first, left to right, and the resulting order
//! is the order in which values are assigned to consecutive signal offsets.

use crate::error::{InputError, Result, WitcalcError};
use num_bigint::BigInt;
use num_traits::FromPrimitive;
use serde_json::Value;
use std::collections::BTreeMap;

/// Named circuit inputs; each name addresses a disjoint signal range
pub type Inputs = BTreeMap<String, InputValue>;

/// A normalized input: an integer or an ordered sequence of inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValue {
    Integer(BigInt),
    Sequence(Vec<InputValue>),
}

impl InputValue {
    /// Normalize a decoded JSON value
    pub fn normalize(value: &Value) -> std::result::Result<Self, InputError> {
        match value {
            Value::String(s) => parse_integer_literal(s)
                .map(InputValue::Integer)
                .ok_or_else(|| InputError::BadLiteral(s.clone())),
            Value::Number(n) => {
                let int = if let Some(i) = n.as_i64() {
                    Some(BigInt::from(i))
                } else if let Some(u) = n.as_u64() {
                    Some(BigInt::from(u))
                } else {
                    n.as_f64().and_then(|f| BigInt::from_f64(f.trunc()))
                };
                int.map(InputValue::Integer)
                    .ok_or_else(|| InputError::BadNumber(n.to_string()))
            }
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    Self::normalize(item).map_err(|source| InputError::AtIndex {
                        index,
                        source: Box::new(source),
                    })
                })
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(InputValue::Sequence),
            Value::Object(_) => Err(InputError::UnsupportedType("object")),
            Value::Bool(_) => Err(InputError::UnsupportedType("boolean")),
            Value::Null => Err(InputError::UnsupportedType("null")),
        }
    }

    /// Leaves in depth-first, left-to-right order
    pub fn flatten(&self) -> Vec<BigInt> {
        let mut acc = Vec::with_capacity(self.leaf_count());
        self.flatten_into(&mut acc);
        acc
    }

    fn flatten_into(&self, acc: &mut Vec<BigInt>) {
        match self {
            InputValue::Integer(v) => acc.push(v.clone()),
            InputValue::Sequence(items) => {
                for item in items {
                    item.flatten_into(acc);
                }
            }
        }
    }

    /// Number of integer leaves
    pub fn leaf_count(&self) -> usize {
        match self {
            InputValue::Integer(_) => 1,
            InputValue::Sequence(items) => items.iter().map(InputValue::leaf_count).sum(),
        }
    }
}

impl From<BigInt> for InputValue {
    fn from(value: BigInt) -> Self {
        InputValue::Integer(value)
    }
}

impl From<i64> for InputValue {
    fn from(value: i64) -> Self {
        InputValue::Integer(BigInt::from(value))
    }
}

impl From<u64> for InputValue {
    fn from(value: u64) -> Self {
        InputValue::Integer(BigInt::from(value))
    }
}

impl<T: Into<InputValue>> From<Vec<T>> for InputValue {
    fn from(items: Vec<T>) -> Self {
        InputValue::Sequence(items.into_iter().map(Into::into).collect())
    }
}

/// Parse an integer literal with an optional sign and `0x`/`0o`/`0b` prefix
///
/// Unprefixed literals are decimal, including ones with leading zeros.
pub fn parse_integer_literal(literal: &str) -> Option<BigInt> {
    let (negative, rest) = match literal.as_bytes().first()? {
        b'-' => (true, &literal[1..]),
        b'+' => (false, &literal[1..]),
        _ => (false, literal),
    };

    let (radix, digits) = match rest.get(..2) {
        Some("0x") | Some("0X") => (16, &rest[2..]),
        Some("0o") | Some("0O") => (8, &rest[2..]),
        Some("0b") | Some("0B") => (2, &rest[2..]),
        _ => (10, rest),
    };

    // parse_bytes would accept a second sign here
    if !digits.bytes().next()?.is_ascii_alphanumeric() {
        return None;
    }

    let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix)?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Parse a JSON input document into named, normalized inputs
pub fn parse_inputs(json: &str) -> Result<Inputs> {
    let document: Value = serde_json::from_str(json)?;
    let entries = match document {
        Value::Object(entries) => entries,
        other => {
            return Err(WitcalcError::InvalidDocument(format!(
                "expected a JSON object, found {}",
                json_type(&other)
            )))
        }
    };

    entries
        .iter()
        .map(|(name, value)| {
            InputValue::normalize(value)
                .map(|input| (name.clone(), input))
                .map_err(|source| WitcalcError::InvalidInput {
                    name: name.clone(),
                    source,
                })
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
