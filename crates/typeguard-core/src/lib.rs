pub mod array;
pub mod error;
pub mod id;
pub mod key;
pub mod object;
pub mod registry;
pub mod value;

// Re-export commonly used types
pub use array::Array;
pub use error::CoreError;
pub use id::ClassId;
pub use key::ArrayKey;
pub use object::Object;
pub use registry::{
    ClassDecl, ClassDef, ClassKind, ClassRegistry, RegistryConfig, Relation, CLOSURE_CLASS,
    INVOKE_METHOD, TRAVERSABLE_INTERFACE,
};
pub use value::Value;
