//! Opaque scalar values read from collection tables.

use serde::Serialize;

/// One value column of a tuple.
///
/// The set of value columns differs per collection table, so values are kept
/// dynamically typed and serialized as plain JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Encode raw bytes as a lowercase hex string.
    ///
    /// Binary columns have no JSON scalar of their own.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::Text(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}
