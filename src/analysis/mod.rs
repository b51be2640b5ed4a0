//! API inference
//!
//! This module turns the class model into an API definition: settings and
//! naming, meta-annotation resolution, type translation with its Jackson and
//! kotlinx.serialization class strategies, and the Spring endpoint reader
//! that drives it all.

pub mod annotations;
pub mod endpoints;
pub mod jackson;
pub mod names;
pub mod serialization;
pub mod settings;
pub mod translator;
pub mod uri;

pub use annotations::{AliasFor, AnnotationResolver, ResolvedAnnotation};
pub use endpoints::read_api_definition;
pub use names::NameTranslator;
pub use settings::TranslationSettings;
pub use translator::{ClassStrategy, TypeTranslator};
pub use uri::parse_spring_uri_template;
