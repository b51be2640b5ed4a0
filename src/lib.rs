//! apinfer infers the HTTP API of a Spring application from facts about its
//! compiled classes, producing a language-neutral description of endpoints
//! and data types for client code generators.

pub mod analysis;
pub mod api;
pub mod core;
pub mod errors;
pub mod frontend;
pub mod infrastructure;
pub mod model;
pub mod utils;

// Re-export commonly used items
pub use analysis::{read_api_definition, TranslationSettings, TypeTranslator};
pub use api::{ApiDefinition, ApiType, ApiTypeName};
pub use crate::core::{JavaType, TypeEnvironment, TypeSchema};
pub use errors::{Result, TranslationError};
pub use frontend::{cli_main, Config};
pub use infrastructure::{init_logging, LogConfig, LogFormat, LogOutput};
pub use model::{ClassCollection, JavaClass, JavaModel};
