//! The type matcher: does a value satisfy a type specification?
//!
//! Alternatives are tried in order and the first match wins. Every question
//! that depends on the host (class hierarchy, methods, free functions) goes
//! to the [`ClassRegistry`]; nothing is ever invoked.
//!
//! All functions here are pure.

use typeguard_core::{
    Array, ArrayKey, ClassRegistry, Value, INVOKE_METHOD, TRAVERSABLE_INTERFACE,
};

use crate::typespec::{PrimitiveKind, TypeAlternative, TypeSpec};

/// Returns true if `value` satisfies at least one alternative of `spec`.
pub fn matches(value: &Value, spec: &TypeSpec, registry: &ClassRegistry) -> bool {
    spec.alternatives()
        .iter()
        .any(|alternative| matches_alternative(value, alternative, registry))
}

/// Returns true if `value` satisfies a single alternative.
pub fn matches_alternative(
    value: &Value,
    alternative: &TypeAlternative,
    registry: &ClassRegistry,
) -> bool {
    match alternative {
        TypeAlternative::Primitive(kind) => PrimitiveKind::of(value) == *kind,
        TypeAlternative::Callable => is_callable(value, registry),
        TypeAlternative::Traversable => is_traversable(value, registry),
        TypeAlternative::Named(name) => match value {
            Value::Object(object) => registry.instance_of(object.class(), name),
            _ => false,
        },
    }
}

/// Returns true if the registry recognizes `value` as invocable:
///
/// - an object whose class (or a supertype) declares `__invoke`;
/// - a string naming a registered free function;
/// - a string `Class::method` naming a method of a registered class;
/// - a two-element list `[class name or object, method name]`.
pub fn is_callable(value: &Value, registry: &ClassRegistry) -> bool {
    match value {
        Value::Object(object) => registry.has_method(object.class(), INVOKE_METHOD),
        Value::String(name) => match name.split_once("::") {
            Some((class, method)) => registry.has_method(class, method),
            None => registry.is_function(name),
        },
        Value::Array(array) => is_callable_pair(array, registry),
        _ => false,
    }
}

fn is_callable_pair(array: &Array, registry: &ClassRegistry) -> bool {
    if array.len() != 2 {
        return false;
    }
    let (Some(target), Some(Value::String(method))) =
        (array.get(&ArrayKey::Int(0)), array.get(&ArrayKey::Int(1)))
    else {
        return false;
    };
    match target {
        Value::String(class) => registry.has_method(class, method),
        Value::Object(object) => registry.has_method(object.class(), method),
        _ => false,
    }
}

/// Returns true for arrays and for objects whose class implements the
/// traversable interface.
pub fn is_traversable(value: &Value, registry: &ClassRegistry) -> bool {
    match value {
        Value::Array(_) => true,
        Value::Object(object) => registry.instance_of(object.class(), TRAVERSABLE_INTERFACE),
        _ => false,
    }
}
