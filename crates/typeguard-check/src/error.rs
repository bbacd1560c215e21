//! Contract failures with structured fields.
//!
//! [`AssertionError`] is returned by every check that does not hold. Each
//! variant carries the data a caller needs to build further diagnostics
//! (subject name, expected type, offending key) without reparsing the
//! message. [`FailureKind`] encodes which failures specialize which, so a
//! caller can handle "any parameter failure" or only "element type
//! failures" with [`AssertionError::is`].

use serde::{Deserialize, Serialize};
use typeguard_core::{ArrayKey, Value};

/// Subject name used when the type argument of a check is itself malformed.
pub(crate) const TYPE_ARGUMENT: &str = "type";

/// A failed contract check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssertionError {
    /// A condition required before an operation did not hold.
    #[error("Precondition failed: {description}")]
    Precondition { description: String },

    /// A condition required after an operation did not hold.
    #[error("Postcondition failed: {description}")]
    Postcondition { description: String },

    /// A condition required mid-computation did not hold.
    #[error("Invariant failed: {description}")]
    Invariant { description: String },

    /// A caller-supplied argument violated an explicit contract.
    #[error("Bad value for parameter {parameter}: {description}")]
    Parameter {
        /// Name of the offending parameter.
        parameter: String,
        description: String,
    },

    /// The key-type tag passed to a key check is not `integer` or `string`.
    /// The call itself is malformed; no value was inspected.
    #[error("Bad value for parameter {parameter}: {description}")]
    UnsupportedType {
        parameter: String,
        description: String,
    },

    /// A value's runtime type does not satisfy a type specification.
    #[error("Bad value for parameter {parameter}: {description}")]
    ParameterType {
        parameter: String,
        /// The specification the value had to satisfy.
        expected: String,
        description: String,
    },

    /// An element of a container does not satisfy the element specification.
    #[error(
        "Bad value for parameter {parameter}: all elements must be {element_type}, got {actual} at key {key}"
    )]
    ParameterElementType {
        parameter: String,
        /// The specification every element had to satisfy.
        element_type: String,
        /// Key of the first failing element.
        key: ArrayKey,
        /// Rendering of the first failing element.
        actual: String,
    },

    /// A key of a container is not of the required key type.
    #[error("Bad value for parameter {parameter}: all keys must be {key_type}, got key {key}")]
    ParameterKeyType {
        parameter: String,
        /// `integer` or `string`.
        key_type: String,
        /// The first offending key, as stored.
        key: ArrayKey,
    },
}

impl AssertionError {
    /// A type failure for `actual` against the specification text `expected`.
    pub fn parameter_type(parameter: &str, expected: &str, actual: &Value) -> Self {
        AssertionError::ParameterType {
            parameter: parameter.to_string(),
            expected: expected.to_string(),
            description: format!("must be a {expected}, got {actual} instead"),
        }
    }

    pub(crate) fn non_empty_string(parameter: &str) -> Self {
        AssertionError::ParameterType {
            parameter: parameter.to_string(),
            expected: "non-empty string".to_string(),
            description: "must be a non-empty string".to_string(),
        }
    }

    pub(crate) fn unsupported_key_type() -> Self {
        AssertionError::UnsupportedType {
            parameter: TYPE_ARGUMENT.to_string(),
            description: r#"must be "integer" or "string""#.to_string(),
        }
    }

    pub(crate) fn empty_type_spec() -> Self {
        AssertionError::Parameter {
            parameter: TYPE_ARGUMENT.to_string(),
            description: "must be a non-empty type specification".to_string(),
        }
    }

    /// The most specific kind of this failure.
    pub fn kind(&self) -> FailureKind {
        match self {
            AssertionError::Precondition { .. } => FailureKind::Precondition,
            AssertionError::Postcondition { .. } => FailureKind::Postcondition,
            AssertionError::Invariant { .. } => FailureKind::Invariant,
            AssertionError::Parameter { .. } => FailureKind::Parameter,
            AssertionError::UnsupportedType { .. } => FailureKind::UnsupportedType,
            AssertionError::ParameterType { .. } => FailureKind::ParameterType,
            AssertionError::ParameterElementType { .. } => FailureKind::ParameterElementType,
            AssertionError::ParameterKeyType { .. } => FailureKind::ParameterKeyType,
        }
    }

    /// Returns true if this failure is `kind` or a specialization of it.
    pub fn is(&self, kind: FailureKind) -> bool {
        self.kind().is_a(kind)
    }

    /// The parameter the failure is about; `None` for bare
    /// precondition/postcondition/invariant failures.
    pub fn parameter_name(&self) -> Option<&str> {
        match self {
            AssertionError::Precondition { .. }
            | AssertionError::Postcondition { .. }
            | AssertionError::Invariant { .. } => None,
            AssertionError::Parameter { parameter, .. }
            | AssertionError::UnsupportedType { parameter, .. }
            | AssertionError::ParameterType { parameter, .. }
            | AssertionError::ParameterElementType { parameter, .. }
            | AssertionError::ParameterKeyType { parameter, .. } => Some(parameter),
        }
    }

    /// The type the checked value had to satisfy: the specification for type
    /// failures, the element specification for element failures.
    pub fn expected_type(&self) -> Option<&str> {
        match self {
            AssertionError::ParameterType { expected, .. } => Some(expected),
            AssertionError::ParameterElementType { element_type, .. } => Some(element_type),
            _ => None,
        }
    }

    pub fn element_type(&self) -> Option<&str> {
        match self {
            AssertionError::ParameterElementType { element_type, .. } => Some(element_type),
            _ => None,
        }
    }

    pub fn key_type(&self) -> Option<&str> {
        match self {
            AssertionError::ParameterKeyType { key_type, .. } => Some(key_type),
            _ => None,
        }
    }

    /// Key of the first failing element or offending key.
    pub fn offending_key(&self) -> Option<&ArrayKey> {
        match self {
            AssertionError::ParameterElementType { key, .. }
            | AssertionError::ParameterKeyType { key, .. } => Some(key),
            _ => None,
        }
    }

    /// The full human-readable message.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Failure kinds, arranged in a specialization hierarchy rooted at
/// [`FailureKind::Assertion`]:
///
/// ```text
/// Assertion
/// ├── Precondition
/// ├── Postcondition
/// ├── Invariant
/// └── Parameter
///     ├── UnsupportedType
///     ├── ParameterKeyType
///     └── ParameterType
///         └── ParameterElementType
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Root of every contract failure; never produced directly.
    Assertion,
    Precondition,
    Postcondition,
    Invariant,
    Parameter,
    UnsupportedType,
    ParameterType,
    ParameterElementType,
    ParameterKeyType,
}

impl FailureKind {
    /// The kind this one specializes, or `None` for the root.
    pub fn parent(self) -> Option<FailureKind> {
        match self {
            FailureKind::Assertion => None,
            FailureKind::Precondition
            | FailureKind::Postcondition
            | FailureKind::Invariant
            | FailureKind::Parameter => Some(FailureKind::Assertion),
            FailureKind::UnsupportedType
            | FailureKind::ParameterType
            | FailureKind::ParameterKeyType => Some(FailureKind::Parameter),
            FailureKind::ParameterElementType => Some(FailureKind::ParameterType),
        }
    }

    /// Returns true if `self` is `other` or one of its specializations.
    pub fn is_a(self, other: FailureKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == other {
                return true;
            }
            current = kind.parent();
        }
        false
    }
}
