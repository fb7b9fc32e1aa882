//! Witness vector

use num_bigint::BigUint;
use serde::{Serialize, Serializer};
use std::ops::Index;

/// Ordered assignment of every circuit variable, index = variable index
///
/// Serializes as a JSON array of decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Witness(Vec<BigUint>);

impl Witness {
    pub fn new(values: Vec<BigUint>) -> Self {
        Witness(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BigUint> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BigUint> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[BigUint] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<BigUint> {
        self.0
    }

    pub fn to_decimal_strings(&self) -> Vec<String> {
        self.0.iter().map(BigUint::to_string).collect()
    }
}

impl From<Vec<BigUint>> for Witness {
    fn from(values: Vec<BigUint>) -> Self {
        Witness(values)
    }
}

impl Index<usize> for Witness {
    type Output = BigUint;

    fn index(&self, index: usize) -> &BigUint {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a Witness {
    type Item = &'a BigUint;
    type IntoIter = std::slice::Iter<'a, BigUint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Witness {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(BigUint::to_string))
    }
}
