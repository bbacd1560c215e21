//! ClassRegistry: the class/interface table consulted by type checks.
//!
//! The registry plays the role of the host's reflection facility. It stores
//! every known class and interface as a node in a petgraph [`DiGraph`] whose
//! edges point from a subtype to each of its direct supertypes, so
//! "is `A` an instance of `B`" is a reachability query. It also keeps the
//! free-function table used to decide whether a string names something
//! invocable.
//!
//! Names are matched case-insensitively; the declared spelling is kept for
//! display.
//!
//! On construction the registry pre-registers the built-in types:
//! - `Traversable` (interface)
//! - `Iterator`, `IteratorAggregate` (interfaces extending `Traversable`)
//! - `ArrayAccess`, `Countable` (interfaces)
//! - `ArrayObject` (class implementing `IteratorAggregate`, `ArrayAccess`, `Countable`)
//! - `ArrayIterator` (class implementing `Iterator`, `ArrayAccess`, `Countable`)
//! - `Closure` (class with `__invoke`)
//! - `stdClass` (class)

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use petgraph::algo::has_path_connecting;
use petgraph::graph::DiGraph;
use petgraph::visit::Dfs;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::ClassId;

/// Interface implemented by everything iterable.
pub const TRAVERSABLE_INTERFACE: &str = "Traversable";

/// Class of anonymous function objects.
pub const CLOSURE_CLASS: &str = "Closure";

/// Method that makes instances of a class invocable.
pub const INVOKE_METHOD: &str = "__invoke";

/// Whether a registered type is a concrete class or an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
}

/// Label of an inheritance edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    /// Class to parent class, or interface to parent interface.
    Extends,
    /// Class to implemented interface.
    Implements,
}

/// A registered class or interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDef {
    /// Name as declared.
    pub name: String,
    pub kind: ClassKind,
    /// Declared methods, lowercased.
    pub methods: IndexSet<String>,
}

/// Declaration of a class or interface to register.
///
/// Deserializable so registries can be described in configuration files;
/// everything but `name` defaults to empty / `class`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub methods: Vec<String>,
}

impl ClassDecl {
    pub fn class(name: impl Into<String>) -> Self {
        ClassDecl {
            name: name.into(),
            kind: ClassKind::Class,
            ..Default::default()
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        ClassDecl {
            name: name.into(),
            kind: ClassKind::Interface,
            ..Default::default()
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends.push(parent.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.implements.push(interface.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.methods.push(method.into());
        self
    }
}

/// Declarative description of the user types and functions a registry
/// should know about, on top of the built-ins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
    #[serde(default)]
    pub functions: Vec<String>,
}

/// Registry of classes, interfaces and free functions.
#[derive(Debug, Clone)]
pub struct ClassRegistry {
    /// Inheritance graph; edges run subtype -> supertype.
    graph: DiGraph<ClassDef, Relation>,
    /// Lowercased name lookup.
    names: HashMap<String, ClassId>,
    /// Lowercased free-function names.
    functions: HashSet<String>,
}

impl ClassRegistry {
    /// Creates a registry with the built-in types pre-registered.
    pub fn new() -> Self {
        let mut registry = ClassRegistry {
            graph: DiGraph::new(),
            names: HashMap::new(),
            functions: HashSet::new(),
        };

        let traversable = registry.add(TRAVERSABLE_INTERFACE, ClassKind::Interface, &[], &[]);
        let iterator = registry.add(
            "Iterator",
            ClassKind::Interface,
            &[(traversable, Relation::Extends)],
            &["current", "key", "next", "rewind", "valid"],
        );
        let aggregate = registry.add(
            "IteratorAggregate",
            ClassKind::Interface,
            &[(traversable, Relation::Extends)],
            &["getIterator"],
        );
        let array_access = registry.add(
            "ArrayAccess",
            ClassKind::Interface,
            &[],
            &["offsetExists", "offsetGet", "offsetSet", "offsetUnset"],
        );
        let countable = registry.add("Countable", ClassKind::Interface, &[], &["count"]);
        registry.add(
            "ArrayObject",
            ClassKind::Class,
            &[
                (aggregate, Relation::Implements),
                (array_access, Relation::Implements),
                (countable, Relation::Implements),
            ],
            &[
                "getIterator",
                "count",
                "offsetExists",
                "offsetGet",
                "offsetSet",
                "offsetUnset",
            ],
        );
        registry.add(
            "ArrayIterator",
            ClassKind::Class,
            &[
                (iterator, Relation::Implements),
                (array_access, Relation::Implements),
                (countable, Relation::Implements),
            ],
            &[
                "current",
                "key",
                "next",
                "rewind",
                "valid",
                "count",
                "offsetExists",
                "offsetGet",
                "offsetSet",
                "offsetUnset",
            ],
        );
        registry.add(CLOSURE_CLASS, ClassKind::Class, &[], &[INVOKE_METHOD, "bind", "call"]);
        registry.add("stdClass", ClassKind::Class, &[], &[]);

        registry
    }

    /// Builds a registry from configuration, on top of the built-ins.
    ///
    /// Classes are registered in order, so supertypes must be declared
    /// before the types that extend them.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, CoreError> {
        let mut registry = ClassRegistry::new();
        for decl in &config.classes {
            registry.register(decl.clone())?;
        }
        for function in &config.functions {
            registry.register_function(function.as_str());
        }
        tracing::debug!(
            classes = config.classes.len(),
            functions = config.functions.len(),
            "built class registry from config"
        );
        Ok(registry)
    }

    /// Registers a class or interface and returns its [`ClassId`].
    ///
    /// All supertypes must already be registered. A class may extend at most
    /// one class and implement any number of interfaces; an interface may
    /// extend any number of interfaces and implements nothing.
    pub fn register(&mut self, decl: ClassDecl) -> Result<ClassId, CoreError> {
        if self.names.contains_key(&decl.name.to_ascii_lowercase()) {
            return Err(CoreError::DuplicateClassName { name: decl.name });
        }

        let parents = self.resolve_all(&decl.extends)?;
        let interfaces = self.resolve_all(&decl.implements)?;

        match decl.kind {
            ClassKind::Class => {
                if parents.len() > 1 {
                    return Err(CoreError::MultipleInheritance {
                        name: decl.name,
                        count: parents.len(),
                    });
                }
                self.expect_kind(&decl.name, &parents, ClassKind::Class)?;
                self.expect_kind(&decl.name, &interfaces, ClassKind::Interface)?;
            }
            ClassKind::Interface => {
                if !interfaces.is_empty() {
                    return Err(CoreError::InvalidParent {
                        name: decl.name,
                        reason: "interfaces extend other interfaces instead of implementing them"
                            .into(),
                    });
                }
                self.expect_kind(&decl.name, &parents, ClassKind::Interface)?;
            }
        }

        let supertypes: Vec<(ClassId, Relation)> = parents
            .into_iter()
            .map(|id| (id, Relation::Extends))
            .chain(interfaces.into_iter().map(|id| (id, Relation::Implements)))
            .collect();
        let methods: Vec<&str> = decl.methods.iter().map(String::as_str).collect();
        let id = self.add(&decl.name, decl.kind, &supertypes, &methods);

        tracing::trace!(class = %decl.name, %id, kind = ?decl.kind, "registered class");
        Ok(id)
    }

    /// Adds a free function to the function table. Returns false if it was
    /// already known.
    pub fn register_function(&mut self, name: &str) -> bool {
        self.functions.insert(name.to_ascii_lowercase())
    }

    /// Looks up a class by its [`ClassId`].
    pub fn get(&self, id: ClassId) -> Option<&ClassDef> {
        self.graph.node_weight(id.into())
    }

    /// Looks up a class's [`ClassId`] by name (case-insensitive).
    pub fn get_by_name(&self, name: &str) -> Option<ClassId> {
        self.names.get(&name.to_ascii_lowercase()).copied()
    }

    /// Number of registered classes and interfaces, built-ins included.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns true if `sub` is `sup` or reaches it through extends/implements
    /// edges.
    pub fn is_subtype(&self, sub: ClassId, sup: ClassId) -> bool {
        sub == sup || has_path_connecting(&self.graph, sub.into(), sup.into(), None)
    }

    /// Returns true if an instance of `class` is an instance of `target`.
    ///
    /// Unregistered classes are only instances of themselves.
    pub fn instance_of(&self, class: &str, target: &str) -> bool {
        if class.eq_ignore_ascii_case(target) {
            return true;
        }
        match (self.get_by_name(class), self.get_by_name(target)) {
            (Some(sub), Some(sup)) => self.is_subtype(sub, sup),
            _ => false,
        }
    }

    /// Returns true if `class` or any of its supertypes declares `method`.
    pub fn has_method(&self, class: &str, method: &str) -> bool {
        let Some(id) = self.get_by_name(class) else {
            return false;
        };
        let method = method.to_ascii_lowercase();
        let mut dfs = Dfs::new(&self.graph, id.into());
        while let Some(idx) = dfs.next(&self.graph) {
            if self.graph[idx].methods.contains(&method) {
                return true;
            }
        }
        false
    }

    /// Returns true if `name` is a registered free function.
    pub fn is_function(&self, name: &str) -> bool {
        self.functions.contains(&name.to_ascii_lowercase())
    }

    fn resolve_all(&self, names: &[String]) -> Result<Vec<ClassId>, CoreError> {
        names
            .iter()
            .map(|name| {
                self.get_by_name(name)
                    .ok_or_else(|| CoreError::UnknownClass { name: name.clone() })
            })
            .collect()
    }

    fn expect_kind(&self, name: &str, ids: &[ClassId], kind: ClassKind) -> Result<(), CoreError> {
        for &id in ids {
            if let Some(def) = self.get(id) {
                if def.kind != kind {
                    let (actual, wanted) = match kind {
                        ClassKind::Class => ("an interface", "a class"),
                        ClassKind::Interface => ("a class", "an interface"),
                    };
                    return Err(CoreError::InvalidParent {
                        name: name.to_string(),
                        reason: format!("'{}' is {actual}, expected {wanted}", def.name),
                    });
                }
            }
        }
        Ok(())
    }

    /// Inserts a node and its supertype edges without validation.
    fn add(
        &mut self,
        name: &str,
        kind: ClassKind,
        supertypes: &[(ClassId, Relation)],
        methods: &[&str],
    ) -> ClassId {
        let idx = self.graph.add_node(ClassDef {
            name: name.to_string(),
            kind,
            methods: methods.iter().map(|m| m.to_ascii_lowercase()).collect(),
        });
        for &(sup, relation) in supertypes {
            self.graph.add_edge(idx, sup.into(), relation);
        }
        let id = ClassId::from(idx);
        self.names.insert(name.to_ascii_lowercase(), id);
        id
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exceptions() -> ClassRegistry {
        let mut reg = ClassRegistry::new();
        reg.register(ClassDecl::interface("Throwable")).unwrap();
        reg.register(
            ClassDecl::class("Exception")
                .implements("Throwable")
                .method("getMessage"),
        )
        .unwrap();
        reg.register(ClassDecl::class("RuntimeException").extends("Exception"))
            .unwrap();
        reg.register(ClassDecl::class("LogicException").extends("Exception"))
            .unwrap();
        reg
    }

    // -----------------------------------------------------------------------
    // Built-ins
    // -----------------------------------------------------------------------

    #[test]
    fn new_registry_has_builtin_types() {
        let reg = ClassRegistry::new();
        assert_eq!(reg.len(), 9);
        for name in [
            "Traversable",
            "Iterator",
            "IteratorAggregate",
            "ArrayAccess",
            "Countable",
            "ArrayObject",
            "ArrayIterator",
            "Closure",
            "stdClass",
        ] {
            assert!(reg.get_by_name(name).is_some(), "{name} missing");
        }
    }

    #[test]
    fn builtin_kinds() {
        let reg = ClassRegistry::new();
        let traversable = reg.get(reg.get_by_name("Traversable").unwrap()).unwrap();
        assert_eq!(traversable.kind, ClassKind::Interface);
        let closure = reg.get(reg.get_by_name("Closure").unwrap()).unwrap();
        assert_eq!(closure.kind, ClassKind::Class);
    }

    #[test]
    fn array_object_is_traversable_but_not_iterator() {
        let reg = ClassRegistry::new();
        assert!(reg.instance_of("ArrayObject", "Traversable"));
        assert!(reg.instance_of("ArrayObject", "IteratorAggregate"));
        assert!(reg.instance_of("ArrayObject", "Countable"));
        assert!(!reg.instance_of("ArrayObject", "Iterator"));
        assert!(reg.instance_of("ArrayIterator", "Iterator"));
        assert!(reg.instance_of("ArrayIterator", "Traversable"));
    }

    #[test]
    fn closure_is_invocable() {
        let reg = ClassRegistry::new();
        assert!(reg.has_method("Closure", INVOKE_METHOD));
        assert!(!reg.has_method("stdClass", INVOKE_METHOD));
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    #[test]
    fn register_returns_unique_ids() {
        let mut reg = ClassRegistry::new();
        let a = reg.register(ClassDecl::class("A")).unwrap();
        let b = reg.register(ClassDecl::class("B")).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, ClassId(9)); // First after builtins
        assert_eq!(reg.get_by_name("A"), Some(a));
        assert_eq!(reg.get(b).unwrap().name, "B");
    }

    #[test]
    fn duplicate_name_is_case_insensitive() {
        let mut reg = ClassRegistry::new();
        reg.register(ClassDecl::class("Foo")).unwrap();
        match reg.register(ClassDecl::class("FOO")) {
            Err(CoreError::DuplicateClassName { name }) => assert_eq!(name, "FOO"),
            other => panic!("expected DuplicateClassName, got {other:?}"),
        }
        assert!(matches!(
            reg.register(ClassDecl::class("stdclass")),
            Err(CoreError::DuplicateClassName { .. })
        ));
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut reg = ClassRegistry::new();
        match reg.register(ClassDecl::class("Child").extends("Missing")) {
            Err(CoreError::UnknownClass { name }) => assert_eq!(name, "Missing"),
            other => panic!("expected UnknownClass, got {other:?}"),
        }
        assert!(reg.get_by_name("Child").is_none());
    }

    #[test]
    fn class_cannot_extend_two_classes() {
        let mut reg = ClassRegistry::new();
        reg.register(ClassDecl::class("A")).unwrap();
        reg.register(ClassDecl::class("B")).unwrap();
        let err = reg
            .register(ClassDecl::class("C").extends("A").extends("B"))
            .unwrap_err();
        assert!(matches!(err, CoreError::MultipleInheritance { count: 2, .. }));
    }

    #[test]
    fn kind_mismatches_are_rejected() {
        let mut reg = ClassRegistry::new();
        assert!(matches!(
            reg.register(ClassDecl::class("A").extends("Countable")),
            Err(CoreError::InvalidParent { .. })
        ));
        assert!(matches!(
            reg.register(ClassDecl::class("B").implements("stdClass")),
            Err(CoreError::InvalidParent { .. })
        ));
        assert!(matches!(
            reg.register(ClassDecl::interface("I").extends("stdClass")),
            Err(CoreError::InvalidParent { .. })
        ));
        assert!(matches!(
            reg.register(ClassDecl::interface("J").implements("Countable")),
            Err(CoreError::InvalidParent { .. })
        ));
    }

    #[test]
    fn interfaces_support_multiple_inheritance() {
        let mut reg = ClassRegistry::new();
        reg.register(
            ClassDecl::interface("Collection")
                .extends("Traversable")
                .extends("Countable"),
        )
        .unwrap();
        reg.register(ClassDecl::class("Bag").implements("Collection"))
            .unwrap();
        assert!(reg.instance_of("Bag", "Collection"));
        assert!(reg.instance_of("Bag", "Traversable"));
        assert!(reg.instance_of("Bag", "Countable"));
        assert!(!reg.instance_of("Bag", "ArrayAccess"));
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[test]
    fn subclass_is_instance_of_ancestors() {
        let reg = exceptions();
        assert!(reg.instance_of("RuntimeException", "RuntimeException"));
        assert!(reg.instance_of("RuntimeException", "Exception"));
        assert!(reg.instance_of("RuntimeException", "Throwable"));
        assert!(!reg.instance_of("Exception", "RuntimeException"));
        assert!(!reg.instance_of("LogicException", "RuntimeException"));
        assert!(!reg.instance_of("LogicException", "stdClass"));
    }

    #[test]
    fn instance_of_is_case_insensitive() {
        let reg = exceptions();
        assert!(reg.instance_of("runtimeexception", "EXCEPTION"));
    }

    #[test]
    fn unregistered_class_is_only_itself() {
        let reg = exceptions();
        assert!(reg.instance_of("Ghost", "Ghost"));
        assert!(reg.instance_of("Ghost", "ghost"));
        assert!(!reg.instance_of("Ghost", "Exception"));
        assert!(!reg.instance_of("Exception", "Ghost"));
    }

    #[test]
    fn methods_are_inherited() {
        let reg = exceptions();
        assert!(reg.has_method("RuntimeException", "getMessage"));
        assert!(reg.has_method("RuntimeException", "GETMESSAGE"));
        assert!(!reg.has_method("RuntimeException", "getTrace"));
        assert!(!reg.has_method("Ghost", "getMessage"));
    }

    #[test]
    fn functions_are_case_insensitive() {
        let mut reg = ClassRegistry::new();
        assert!(!reg.is_function("time"));
        assert!(reg.register_function("time"));
        assert!(!reg.register_function("TIME"));
        assert!(reg.is_function("Time"));
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    #[test]
    fn from_config_json() {
        let json = r#"{
            "classes": [
                { "name": "Exception", "methods": ["getMessage"] },
                { "name": "RuntimeException", "extends": ["Exception"] },
                { "name": "Handler", "kind": "interface", "methods": ["handle"] },
                { "name": "Logger", "implements": ["Handler"] }
            ],
            "functions": ["time"]
        }"#;
        let config: RegistryConfig = serde_json::from_str(json).unwrap();
        let reg = ClassRegistry::from_config(&config).unwrap();
        assert!(reg.instance_of("RuntimeException", "Exception"));
        assert!(reg.instance_of("Logger", "Handler"));
        assert!(reg.has_method("Logger", "handle"));
        assert!(reg.is_function("time"));
        assert_eq!(reg.len(), 13);
    }

    #[test]
    fn from_config_requires_declaration_order() {
        let config = RegistryConfig {
            classes: vec![
                ClassDecl::class("Child").extends("Parent"),
                ClassDecl::class("Parent"),
            ],
            functions: vec![],
        };
        assert!(matches!(
            ClassRegistry::from_config(&config),
            Err(CoreError::UnknownClass { .. })
        ));
    }

    #[test]
    fn empty_config_is_builtins_only() {
        let config: RegistryConfig = serde_json::from_str("{}").unwrap();
        let reg = ClassRegistry::from_config(&config).unwrap();
        assert_eq!(reg.len(), ClassRegistry::new().len());
    }
}
