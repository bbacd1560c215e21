//! Core error types for typeguard-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering
//! class registration and the construction of runtime values.

use thiserror::Error;

/// Core errors produced by the typeguard-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Attempting to register a class or interface name that already exists.
    #[error("duplicate class name: '{name}'")]
    DuplicateClassName { name: String },

    /// A parent class or interface was referenced before being registered.
    #[error("unknown class or interface: '{name}'")]
    UnknownClass { name: String },

    /// A supertype of the wrong kind (e.g. a class extending an interface).
    #[error("invalid supertype for '{name}': {reason}")]
    InvalidParent { name: String, reason: String },

    /// A class declared more than one parent class.
    #[error("class '{name}' extends {count} classes; at most one is allowed")]
    MultipleInheritance { name: String, count: usize },

    /// Arrays and objects cannot be used as array keys.
    #[error("illegal array key: {kind} values cannot be used as keys")]
    IllegalKey { kind: &'static str },
}
