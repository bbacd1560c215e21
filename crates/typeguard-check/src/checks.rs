//! Contract checks.
//!
//! Every check is a single evaluate-and-branch: `Ok(())` when the contract
//! holds, otherwise an [`AssertionError`] built at the point of detection.
//! Nothing is retried or recovered here; callers propagate with `?`.
//!
//! The free functions use the process-wide [`standard_registry`]. Use a
//! [`Checker`] to check against a registry that knows about your own
//! classes and functions.

use once_cell::sync::Lazy;
use typeguard_core::{ClassRegistry, Value};

use crate::error::AssertionError;
use crate::matcher::matches;
use crate::typespec::{IntoTypeSpec, PrimitiveKind, TypeSpec};

static STANDARD_REGISTRY: Lazy<ClassRegistry> = Lazy::new(ClassRegistry::new);

/// The built-in registry used by the free-function checks. Read-only.
pub fn standard_registry() -> &'static ClassRegistry {
    &STANDARD_REGISTRY
}

fn fail(error: AssertionError) -> AssertionError {
    tracing::debug!(
        kind = ?error.kind(),
        parameter = error.parameter_name(),
        expected = error.expected_type(),
        "contract check failed: {error}"
    );
    error
}

/// Checks a condition that must hold before an operation proceeds.
/// For checking call arguments use [`parameter`] instead.
pub fn precondition(condition: bool, description: &str) -> Result<(), AssertionError> {
    if condition {
        return Ok(());
    }
    Err(fail(AssertionError::Precondition {
        description: description.to_string(),
    }))
}

/// Checks a condition that must hold once a computation is complete.
pub fn postcondition(condition: bool, description: &str) -> Result<(), AssertionError> {
    if condition {
        return Ok(());
    }
    Err(fail(AssertionError::Postcondition {
        description: description.to_string(),
    }))
}

/// Checks a condition that must hold throughout a computation.
pub fn invariant(condition: bool, description: &str) -> Result<(), AssertionError> {
    if condition {
        return Ok(());
    }
    Err(fail(AssertionError::Invariant {
        description: description.to_string(),
    }))
}

/// Checks an explicit contract on the argument `name`.
pub fn parameter(condition: bool, name: &str, description: &str) -> Result<(), AssertionError> {
    if condition {
        return Ok(());
    }
    Err(fail(AssertionError::Parameter {
        parameter: name.to_string(),
        description: description.to_string(),
    }))
}

/// Checks that `value` satisfies `spec`, using the standard registry.
///
/// `spec` may be pipe-delimited text (`"integer|null"`), a list of
/// alternatives (`["integer", "null"]`) or a parsed [`TypeSpec`].
pub fn parameter_type(
    spec: impl IntoTypeSpec,
    value: &Value,
    name: &str,
) -> Result<(), AssertionError> {
    Checker::standard().parameter_type(spec, value, name)
}

/// Checks that `value` is an array whose every element satisfies `spec`,
/// using the standard registry.
pub fn parameter_element_type(
    spec: impl IntoTypeSpec,
    value: &Value,
    name: &str,
) -> Result<(), AssertionError> {
    Checker::standard().parameter_element_type(spec, value, name)
}

/// Checks that `value` is an array whose every key is of `key_type`
/// (`"integer"` or `"string"`).
pub fn parameter_key_type(key_type: &str, value: &Value, name: &str) -> Result<(), AssertionError> {
    Checker::standard().parameter_key_type(key_type, value, name)
}

/// Checks that `value` is a string of at least one byte. Numeric-looking
/// and whitespace-only strings pass.
pub fn non_empty_string(value: &Value, name: &str) -> Result<(), AssertionError> {
    match value {
        Value::String(s) if !s.is_empty() => Ok(()),
        _ => Err(fail(AssertionError::non_empty_string(name))),
    }
}

/// Type checks bound to a particular [`ClassRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct Checker<'r> {
    registry: &'r ClassRegistry,
}

impl<'r> Checker<'r> {
    pub fn new(registry: &'r ClassRegistry) -> Self {
        Checker { registry }
    }

    /// A checker over the [`standard_registry`].
    pub fn standard() -> Checker<'static> {
        Checker::new(standard_registry())
    }

    pub fn registry(&self) -> &'r ClassRegistry {
        self.registry
    }

    /// Returns true if `value` satisfies `spec`.
    pub fn matches(&self, value: &Value, spec: &TypeSpec) -> bool {
        matches(value, spec, self.registry)
    }

    /// Checks that `value` satisfies `spec`.
    ///
    /// A malformed `spec` fails with a `Parameter` failure on `type` before
    /// the value is looked at.
    pub fn parameter_type(
        &self,
        spec: impl IntoTypeSpec,
        value: &Value,
        name: &str,
    ) -> Result<(), AssertionError> {
        let spec = spec.into_type_spec()?;
        if self.matches(value, &spec) {
            return Ok(());
        }
        Err(fail(AssertionError::parameter_type(name, spec.as_str(), value)))
    }

    /// Checks that `value` is an array and every element satisfies `spec`.
    ///
    /// A non-array fails as a whole-parameter `ParameterType` failure; an
    /// array fails on its first non-matching element.
    pub fn parameter_element_type(
        &self,
        spec: impl IntoTypeSpec,
        value: &Value,
        name: &str,
    ) -> Result<(), AssertionError> {
        let spec = spec.into_type_spec()?;
        let Value::Array(array) = value else {
            return Err(fail(AssertionError::parameter_type(
                name,
                PrimitiveKind::Array.tag(),
                value,
            )));
        };

        for (key, element) in array {
            if !self.matches(element, &spec) {
                tracing::trace!(parameter = name, %key, element = %element, "first element failing {spec}");
                return Err(fail(AssertionError::ParameterElementType {
                    parameter: name.to_string(),
                    element_type: spec.as_str().to_string(),
                    key: key.clone(),
                    actual: element.to_string(),
                }));
            }
        }
        Ok(())
    }

    /// Checks that `value` is an array and every key, as stored, is of
    /// `key_type`.
    ///
    /// An unsupported `key_type` fails with `UnsupportedType` before the
    /// value is looked at, even for an empty array.
    pub fn parameter_key_type(
        &self,
        key_type: &str,
        value: &Value,
        name: &str,
    ) -> Result<(), AssertionError> {
        let kind = match PrimitiveKind::from_tag(key_type) {
            Some(kind @ (PrimitiveKind::Integer | PrimitiveKind::String)) => kind,
            _ => return Err(fail(AssertionError::unsupported_key_type())),
        };
        let Value::Array(array) = value else {
            return Err(fail(AssertionError::parameter_type(
                name,
                PrimitiveKind::Array.tag(),
                value,
            )));
        };

        match array.keys().find(|key| key.kind_name() != kind.tag()) {
            None => Ok(()),
            Some(key) => {
                tracing::trace!(parameter = name, %key, "first key that is not {}", kind.tag());
                Err(fail(AssertionError::ParameterKeyType {
                    parameter: name.to_string(),
                    key_type: kind.tag().to_string(),
                    key: key.clone(),
                }))
            }
        }
    }

    /// Same as the free [`non_empty_string`]; no registry involved.
    pub fn non_empty_string(&self, value: &Value, name: &str) -> Result<(), AssertionError> {
        non_empty_string(value, name)
    }
}
