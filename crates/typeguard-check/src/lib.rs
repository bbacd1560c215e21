//! Runtime contract checks with a type-matching engine.
//!
//! - [`checks`]: precondition/postcondition/invariant/parameter checks that
//!   return an [`AssertionError`] when they do not hold.
//! - [`typespec`]: parsing of pipe-delimited type specifications into
//!   [`TypeAlternative`] values.
//! - [`matcher`]: deciding whether a [`Value`](typeguard_core::Value)
//!   satisfies a [`TypeSpec`], consulting a
//!   [`ClassRegistry`](typeguard_core::ClassRegistry) for class, callable and
//!   traversable questions.
//! - [`error`]: the failure taxonomy and its specialization hierarchy.

pub mod checks;
pub mod error;
pub mod matcher;
pub mod typespec;

pub use checks::{
    invariant, non_empty_string, parameter, parameter_element_type, parameter_key_type,
    parameter_type, postcondition, precondition, standard_registry, Checker,
};
pub use error::{AssertionError, FailureKind};
pub use matcher::{is_callable, is_traversable, matches, matches_alternative};
pub use typespec::{IntoTypeSpec, PrimitiveKind, TypeAlternative, TypeSpec};
