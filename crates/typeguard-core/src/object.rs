//! Object instances.
//!
//! An [`Object`] names its class; the class is resolved against a
//! [`ClassRegistry`](crate::ClassRegistry) only when a check needs to know
//! about inheritance or methods.

use indexmap::IndexMap;
use serde::Serialize;

use crate::registry::CLOSURE_CLASS;
use crate::value::Value;

/// An instance of a named class with insertion-ordered properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Object {
    class: String,
    properties: IndexMap<String, Value>,
}

impl Object {
    pub fn new(class: impl Into<String>) -> Self {
        Object {
            class: class.into(),
            properties: IndexMap::new(),
        }
    }

    /// An anonymous function object; invocable through the built-in
    /// `Closure` class.
    pub fn closure() -> Self {
        Object::new(CLOSURE_CLASS)
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_property(name, value);
        self
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> &IndexMap<String, Value> {
        &self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_keep_insertion_order() {
        let object = Object::new("Point")
            .with_property("y", 2)
            .with_property("x", 1);
        let names: Vec<&str> = object.properties().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["y", "x"]);
        assert_eq!(object.property("x"), Some(&Value::Integer(1)));
        assert_eq!(object.property("z"), None);
    }

    #[test]
    fn closure_uses_builtin_class() {
        assert_eq!(Object::closure().class(), "Closure");
    }
}
