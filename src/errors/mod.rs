//! Error types for class model loading and API translation
//!
//! Every fatal condition aborts the whole run. Recoverable conditions (unknown
//! classes, empty controllers) are never errors; they are logged and reported
//! through the resulting `ApiDefinition` instead.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TranslationError>;

#[derive(Error, Debug)]
pub enum TranslationError {
    // Fatal modeling errors
    #[error("type name '{display_name}' is produced by both '{first}' and '{second}'; register a name override for one of them")]
    DuplicateClassName {
        display_name: String,
        first: String,
        second: String,
    },

    #[error("looking up type variable {variable} returned itself in {environment}")]
    SelfReferentialBinding { variable: String, environment: String },

    #[error("translating {kind} types is not supported: {ty}")]
    UnsupportedType { kind: &'static str, ty: String },

    #[error("unsupported union declaration on {class}: {reason}")]
    UnsupportedUnion { class: String, reason: String },

    #[error("no discriminator name defined for subtype {subtype} of {union}")]
    MissingSubtypeName { union: String, subtype: String },

    #[error("parameter {index} of {class}.{method} has no name and no explicit name attribute")]
    MissingParameterName {
        class: String,
        method: String,
        index: usize,
    },

    // Type algebra
    #[error("malformed signature '{signature}' at offset {offset}: {message}")]
    MalformedSignature {
        signature: String,
        offset: usize,
        message: String,
    },

    #[error("tried to add duplicate type variable: {0}")]
    DuplicateTypeVariable(String),

    #[error("unknown type variable {0}")]
    UnknownTypeVariable(String),

    #[error("expected {expected} type arguments, but got {found}")]
    SchemaArity { expected: usize, found: usize },

    // API model
    #[error("tried to add type-definition twice: {0}")]
    DuplicateDefinition(String),

    #[error("no placeholder registered for {0}")]
    MissingPlaceholder(String),

    #[error("duplicate property '{property}' in {class}")]
    DuplicateProperty { class: String, property: String },

    #[error("duplicate case '{case}' in discriminated union {union}")]
    DuplicateUnionCase { union: String, case: String },

    #[error("type {0} is already imported")]
    DuplicateImport(String),

    #[error("malformed URI template: {0}")]
    MalformedUriTemplate(String),

    // Configuration and input
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid class record for {class}: {message}")]
    InvalidClassRecord { class: String, message: String },

    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl TranslationError {
    pub fn malformed(signature: &str, offset: usize, message: impl Into<String>) -> Self {
        Self::MalformedSignature {
            signature: signature.to_string(),
            offset,
            message: message.into(),
        }
    }

    /// Whether this error came from the translated classes rather than from input or IO.
    pub fn is_modeling_error(&self) -> bool {
        !matches!(
            self,
            Self::Config(_) | Self::ConfigWrite(_) | Self::Io(_) | Self::Json(_) | Self::InvalidPattern { .. }
        )
    }
}
