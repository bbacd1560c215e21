//! Type specifications: ordered sets of alternative type descriptors.
//!
//! A specification is written as pipe-delimited text (`"integer|null"`) or
//! given as a pre-split list (`["integer", "null"]`). Either way it is parsed
//! once into a [`TypeSpec`] holding [`TypeAlternative`] values, and is
//! immutable afterwards.
//!
//! Primitive tags are exact. `int`, `bool`, `float` and `callback` are not
//! aliases of anything; they parse as class names and so never match a
//! primitive value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use typeguard_core::{Value, TRAVERSABLE_INTERFACE};

use crate::error::AssertionError;

/// The native kind of a runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Boolean,
    Integer,
    Double,
    String,
    Array,
    Object,
    Null,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 7] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Integer,
        PrimitiveKind::Double,
        PrimitiveKind::String,
        PrimitiveKind::Array,
        PrimitiveKind::Object,
        PrimitiveKind::Null,
    ];

    /// The tag used in specifications for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Double => "double",
            PrimitiveKind::String => "string",
            PrimitiveKind::Array => "array",
            PrimitiveKind::Object => "object",
            PrimitiveKind::Null => "null",
        }
    }

    /// Parses an exact tag. Case and spelling must match [`tag`](Self::tag).
    pub fn from_tag(tag: &str) -> Option<PrimitiveKind> {
        PrimitiveKind::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// The native kind of `value`.
    pub fn of(value: &Value) -> PrimitiveKind {
        match value {
            Value::Null => PrimitiveKind::Null,
            Value::Boolean(_) => PrimitiveKind::Boolean,
            Value::Integer(_) => PrimitiveKind::Integer,
            Value::Double(_) => PrimitiveKind::Double,
            Value::String(_) => PrimitiveKind::String,
            Value::Array(_) => PrimitiveKind::Array,
            Value::Object(_) => PrimitiveKind::Object,
        }
    }
}

/// One alternative of a type specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeAlternative {
    /// Exact native kind.
    Primitive(PrimitiveKind),
    /// Anything the registry considers invocable.
    Callable,
    /// Arrays and objects implementing the traversable interface.
    Traversable,
    /// A class or interface name.
    Named(String),
}

impl TypeAlternative {
    /// Classifies a single, non-empty alternative.
    pub fn parse(text: &str) -> TypeAlternative {
        if let Some(kind) = PrimitiveKind::from_tag(text) {
            return TypeAlternative::Primitive(kind);
        }
        if text == "callable" {
            return TypeAlternative::Callable;
        }
        // Class names are case-insensitive, and so is this one.
        if text.eq_ignore_ascii_case(TRAVERSABLE_INTERFACE) {
            return TypeAlternative::Traversable;
        }
        TypeAlternative::Named(text.to_string())
    }
}

impl fmt::Display for TypeAlternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeAlternative::Primitive(kind) => f.write_str(kind.tag()),
            TypeAlternative::Callable => f.write_str("callable"),
            TypeAlternative::Traversable => f.write_str(TRAVERSABLE_INTERFACE),
            TypeAlternative::Named(name) => f.write_str(name),
        }
    }
}

/// A parsed type specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpec {
    /// The specification as the caller wrote it (lists are joined with `|`).
    text: String,
    alternatives: SmallVec<[TypeAlternative; 4]>,
}

impl TypeSpec {
    /// Parses pipe-delimited text.
    ///
    /// Fails if the text is empty or contains an empty alternative.
    pub fn parse(text: &str) -> Result<TypeSpec, AssertionError> {
        Self::build(text.split('|'), text.to_string())
    }

    /// Builds a specification from a pre-split list of alternatives.
    ///
    /// Fails if the list is empty or contains an empty alternative.
    pub fn from_alternatives<I, S>(alternatives: I) -> Result<TypeSpec, AssertionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parts: Vec<S> = alternatives.into_iter().collect();
        let text = parts
            .iter()
            .map(|part| part.as_ref())
            .collect::<Vec<&str>>()
            .join("|");
        Self::build(parts.iter().map(|part| part.as_ref()), text)
    }

    fn build<'a>(
        parts: impl Iterator<Item = &'a str>,
        text: String,
    ) -> Result<TypeSpec, AssertionError> {
        let mut alternatives = SmallVec::new();
        for part in parts {
            if part.is_empty() {
                return Err(AssertionError::empty_type_spec());
            }
            alternatives.push(TypeAlternative::parse(part));
        }
        if alternatives.is_empty() {
            return Err(AssertionError::empty_type_spec());
        }
        Ok(TypeSpec { text, alternatives })
    }

    /// The specification text, for reporting.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn alternatives(&self) -> &[TypeAlternative] {
        &self.alternatives
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    /// Always false for a successfully parsed specification.
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }
}

impl FromStr for TypeSpec {
    type Err = AssertionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeSpec::parse(s)
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Anything a type check accepts as its specification: pipe-delimited text,
/// a pre-split list of alternatives, or an already parsed [`TypeSpec`].
pub trait IntoTypeSpec {
    fn into_type_spec(self) -> Result<TypeSpec, AssertionError>;
}

impl IntoTypeSpec for TypeSpec {
    fn into_type_spec(self) -> Result<TypeSpec, AssertionError> {
        Ok(self)
    }
}

impl IntoTypeSpec for &TypeSpec {
    fn into_type_spec(self) -> Result<TypeSpec, AssertionError> {
        Ok(self.clone())
    }
}

impl IntoTypeSpec for &str {
    fn into_type_spec(self) -> Result<TypeSpec, AssertionError> {
        TypeSpec::parse(self)
    }
}

impl IntoTypeSpec for String {
    fn into_type_spec(self) -> Result<TypeSpec, AssertionError> {
        TypeSpec::parse(&self)
    }
}

impl IntoTypeSpec for &String {
    fn into_type_spec(self) -> Result<TypeSpec, AssertionError> {
        TypeSpec::parse(self)
    }
}

impl IntoTypeSpec for &[&str] {
    fn into_type_spec(self) -> Result<TypeSpec, AssertionError> {
        TypeSpec::from_alternatives(self)
    }
}

impl IntoTypeSpec for &[String] {
    fn into_type_spec(self) -> Result<TypeSpec, AssertionError> {
        TypeSpec::from_alternatives(self)
    }
}

impl<const N: usize> IntoTypeSpec for [&str; N] {
    fn into_type_spec(self) -> Result<TypeSpec, AssertionError> {
        TypeSpec::from_alternatives(self)
    }
}

impl IntoTypeSpec for Vec<&str> {
    fn into_type_spec(self) -> Result<TypeSpec, AssertionError> {
        TypeSpec::from_alternatives(self)
    }
}

impl IntoTypeSpec for Vec<String> {
    fn into_type_spec(self) -> Result<TypeSpec, AssertionError> {
        TypeSpec::from_alternatives(self)
    }
}
