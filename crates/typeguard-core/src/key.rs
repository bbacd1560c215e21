//! Array keys and the normalization applied when a key is stored.
//!
//! A container only ever holds integer or string keys. Strings that are the
//! canonical decimal spelling of an `i64` are stored as integers, booleans
//! and doubles collapse to integers, and `Null` becomes the empty string.
//! Checks on keys see the normalized representation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A normalized array key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArrayKey {
    Int(i64),
    Str(String),
}

impl ArrayKey {
    /// Normalizes a runtime value into a key.
    ///
    /// Returns `None` for arrays and objects, which cannot be keys.
    pub fn from_value(value: &Value) -> Option<ArrayKey> {
        match value {
            Value::Null => Some(ArrayKey::Str(String::new())),
            Value::Boolean(b) => Some(ArrayKey::from(*b)),
            Value::Integer(i) => Some(ArrayKey::Int(*i)),
            Value::Double(d) => Some(ArrayKey::from(*d)),
            Value::String(s) => Some(ArrayKey::from(s.as_str())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// The native kind tag of the stored key: `integer` or `string`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ArrayKey::Int(_) => "integer",
            ArrayKey::Str(_) => "string",
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(self, ArrayKey::Int(_))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArrayKey::Int(i) => Some(*i),
            ArrayKey::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArrayKey::Int(_) => None,
            ArrayKey::Str(s) => Some(s),
        }
    }
}

/// Parses `s` only if it is the canonical decimal form of an `i64`.
///
/// `"42"` and `"-7"` qualify; `"042"`, `"-0"`, `"+1"`, `"1.0"` and `" 1"` do not.
fn canonical_int(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    if s == "-0" {
        return None;
    }
    // Out-of-range digit strings stay strings.
    s.parse().ok()
}

impl From<i64> for ArrayKey {
    fn from(i: i64) -> Self {
        ArrayKey::Int(i)
    }
}

impl From<i32> for ArrayKey {
    fn from(i: i32) -> Self {
        ArrayKey::Int(i64::from(i))
    }
}

impl From<bool> for ArrayKey {
    fn from(b: bool) -> Self {
        ArrayKey::Int(i64::from(b))
    }
}

impl From<f64> for ArrayKey {
    /// Truncates toward zero; NaN maps to 0 and infinities saturate.
    fn from(d: f64) -> Self {
        ArrayKey::Int(d.trunc() as i64)
    }
}

impl From<&str> for ArrayKey {
    fn from(s: &str) -> Self {
        match canonical_int(s) {
            Some(i) => ArrayKey::Int(i),
            None => ArrayKey::Str(s.to_string()),
        }
    }
}

impl From<String> for ArrayKey {
    fn from(s: String) -> Self {
        match canonical_int(&s) {
            Some(i) => ArrayKey::Int(i),
            None => ArrayKey::Str(s),
        }
    }
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKey::Int(i) => write!(f, "{i}"),
            ArrayKey::Str(s) => write!(f, "{s:?}"),
        }
    }
}
