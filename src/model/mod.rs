//! Class model
//!
//! Read-only facts about compiled classes: types, members, literal
//! annotations and hierarchy queries over the loaded set.

pub mod annotation;
pub mod class;
pub mod jdk;
pub mod loader;
pub mod reader;

pub use annotation::{AnnotatedElement, AnnotationValue, EnumValue, JavaAnnotation};
pub use class::{access, JavaClass, JavaField, JavaMethod, JavaParameter, JavaRecordComponent};
pub use loader::{BoundClass, ClassCollection, ClassDataLoader, JavaModel};
pub use reader::ClassRecord;
