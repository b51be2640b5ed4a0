//! Generic type algebra
//!
//! Host types, type variable schemas and binding environments, plus the
//! reader that builds them from JVM descriptors and generic signatures.

pub mod types;
pub mod signature;

pub use types::{JavaType, TypeSchema, TypeEnvironment};
pub use signature::{
    ClassSignature, MethodSignature, parse_class_signature, parse_generic_type, parse_java_type,
    parse_method_descriptor, parse_method_signature, parse_object_type, parse_type_descriptor,
};
