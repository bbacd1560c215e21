//! The ordered/associative container value.
//!
//! [`Array`] keeps insertion order (via [`IndexMap`]) and tracks the next
//! free integer index so that [`Array::push`] appends after the largest
//! integer key seen so far. Once `i64::MAX` is used as a key there is no
//! next index and `push` stores nothing.

use std::fmt;

use indexmap::map::Iter;
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::CoreError;
use crate::key::ArrayKey;
use crate::value::Value;

/// An insertion-ordered map from normalized keys to values.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Array {
    entries: IndexMap<ArrayKey, Value>,
    /// One past the largest integer key; exceeds `i64::MAX` once that key
    /// is taken.
    #[serde(skip)]
    next_index: i128,
}

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list: values keyed `0..n` in order.
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut array = Array::new();
        for value in values {
            array.push(value);
        }
        array
    }

    /// Builds an array from key/value pairs; keys are normalized and later
    /// duplicates overwrite earlier ones in place.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<ArrayKey>,
        V: Into<Value>,
    {
        let mut array = Array::new();
        for (key, value) in pairs {
            array.insert(key, value);
        }
        array
    }

    /// Appends `value` at the next free integer index and returns its key.
    ///
    /// Returns `None`, leaving the array unchanged, when `i64::MAX` is
    /// already a key.
    pub fn push(&mut self, value: impl Into<Value>) -> Option<ArrayKey> {
        let key = ArrayKey::Int(i64::try_from(self.next_index).ok()?);
        self.insert(key.clone(), value);
        Some(key)
    }

    /// Inserts under a normalized key, returning the previous value if any.
    /// Overwriting keeps the key's original position.
    pub fn insert(&mut self, key: impl Into<ArrayKey>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        if let ArrayKey::Int(i) = key {
            let next = i128::from(i) + 1;
            if next > self.next_index {
                self.next_index = next;
            }
        }
        self.entries.insert(key, value.into())
    }

    /// Inserts using a runtime value as the key.
    ///
    /// Returns [`CoreError::IllegalKey`] for arrays and objects.
    pub fn insert_value_key(
        &mut self,
        key: &Value,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, CoreError> {
        let key = ArrayKey::from_value(key).ok_or(CoreError::IllegalKey {
            kind: key.kind_name(),
        })?;
        Ok(self.insert(key, value))
    }

    /// Removes a key, preserving the order of the remaining entries. The
    /// append cursor is left untouched.
    pub fn remove(&mut self, key: &ArrayKey) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the keys are exactly `0..len` in order.
    pub fn is_list(&self) -> bool {
        self.entries
            .keys()
            .enumerate()
            .all(|(pos, key)| key.as_int() == Some(pos as i64))
    }

    pub fn iter(&self) -> Iter<'_, ArrayKey, Value> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ArrayKey> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }
}

/// Equality compares entries only; the append cursor is not observable
/// through contents.
impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Array::list(iter)
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = (&'a ArrayKey, &'a Value);
    type IntoIter = Iter<'a, ArrayKey, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (pos, (key, value)) in self.entries.iter().enumerate() {
            if pos > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key} => {value}")?;
        }
        f.write_str("]")
    }
}
