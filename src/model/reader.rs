//! JSON class records
//!
//! Class facts arrive as JSON produced by an external bytecode extractor. The
//! records keep the raw class-file spellings (internal names, descriptors and
//! generic signatures) and are converted into the class model here.

use std::fs;
use std::path::Path;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::signature::{parse_class_signature, parse_java_type, parse_method_signature, parse_object_type, parse_type_descriptor};
use crate::core::types::{JavaType, TypeSchema};
use crate::errors::{Result, TranslationError};
use crate::model::annotation::{AnnotationValue, EnumValue, JavaAnnotation};
use crate::model::class::{JavaClass, JavaField, JavaMethod, JavaParameter, JavaRecordComponent};
use crate::model::loader::ClassCollection;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRecord {
    /// Internal name, e.g. `com/example/Foo$Bar`
    pub name: String,

    #[serde(default)]
    pub access: u16,

    #[serde(default)]
    pub signature: Option<String>,

    #[serde(default)]
    pub superclass: Option<String>,

    #[serde(default)]
    pub interfaces: Vec<String>,

    #[serde(default)]
    pub annotations: Vec<AnnotationRecord>,

    #[serde(default)]
    pub fields: Vec<FieldRecord>,

    #[serde(default)]
    pub methods: Vec<MethodRecord>,

    #[serde(default)]
    pub record_components: Vec<RecordComponentRecord>,

    #[serde(default)]
    pub permitted_subclasses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRecord {
    pub name: String,

    #[serde(default)]
    pub access: u16,

    pub descriptor: String,

    #[serde(default)]
    pub signature: Option<String>,

    #[serde(default)]
    pub annotations: Vec<AnnotationRecord>,

    #[serde(default)]
    pub nullable: bool,

    #[serde(default)]
    pub has_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodRecord {
    pub name: String,

    #[serde(default)]
    pub access: u16,

    pub descriptor: String,

    #[serde(default)]
    pub signature: Option<String>,

    #[serde(default)]
    pub annotations: Vec<AnnotationRecord>,

    #[serde(default)]
    pub parameters: Vec<ParameterRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterRecord {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub annotations: Vec<AnnotationRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordComponentRecord {
    pub name: String,

    pub descriptor: String,

    #[serde(default)]
    pub signature: Option<String>,

    #[serde(default)]
    pub annotations: Vec<AnnotationRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Type descriptor of the annotation, e.g. `Lcom/fasterxml/jackson/annotation/JsonIgnore;`
    pub descriptor: String,

    #[serde(default)]
    pub attributes: IndexMap<String, ValueRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueRecord {
    Bool { value: bool },
    Int { value: i64 },
    Float { value: f64 },
    String { value: String },
    Class { descriptor: String },
    Enum { descriptor: String, value: String },
    Annotation(AnnotationRecord),
    Array { values: Vec<ValueRecord> },
}

impl AnnotationRecord {
    fn into_annotation(self) -> Result<JavaAnnotation> {
        let name = class_name_from_descriptor(&self.descriptor)?;
        let mut annotation = JavaAnnotation::new(name);
        for (key, value) in self.attributes {
            annotation.set_attribute(key, value.into_value()?);
        }
        Ok(annotation)
    }
}

impl ValueRecord {
    fn into_value(self) -> Result<AnnotationValue> {
        Ok(match self {
            ValueRecord::Bool { value } => AnnotationValue::Bool(value),
            ValueRecord::Int { value } => AnnotationValue::Int(value),
            ValueRecord::Float { value } => AnnotationValue::Float(value),
            ValueRecord::String { value } => AnnotationValue::String(value),
            ValueRecord::Class { descriptor } => AnnotationValue::Class(parse_type_descriptor(&descriptor)?),
            ValueRecord::Enum { descriptor, value } => {
                AnnotationValue::Enum(EnumValue::new(parse_type_descriptor(&descriptor)?, value))
            }
            ValueRecord::Annotation(record) => AnnotationValue::Annotation(record.into_annotation()?),
            ValueRecord::Array { values } => AnnotationValue::Array(
                values.into_iter().map(ValueRecord::into_value).collect::<Result<_>>()?,
            ),
        })
    }
}

fn class_name_from_descriptor(descriptor: &str) -> Result<String> {
    match parse_type_descriptor(descriptor)? {
        JavaType::Basic(name) => Ok(name),
        other => Err(TranslationError::malformed(descriptor, 0, format!("expected class descriptor, got {}", other))),
    }
}

fn convert_annotations(records: Vec<AnnotationRecord>) -> Result<Vec<JavaAnnotation>> {
    records.into_iter().map(AnnotationRecord::into_annotation).collect()
}

impl ClassRecord {
    pub fn into_class(self) -> Result<JavaClass> {
        let name = self.name.replace('/', ".");

        let (schema, superclass, interfaces) = match &self.signature {
            Some(signature) => {
                let parsed = parse_class_signature(signature)?;
                (parsed.schema, Some(parsed.superclass), parsed.interfaces)
            }
            None => (
                TypeSchema::new(),
                self.superclass.as_deref().map(parse_object_type),
                self.interfaces.iter().map(|i| parse_object_type(i)).collect(),
            ),
        };

        let mut class = JavaClass::new(name.clone(), self.access);
        class.schema = schema;
        class.superclass = superclass;
        class.interfaces = interfaces;
        class.annotations = convert_annotations(self.annotations)?;
        class.permitted_subclasses = self.permitted_subclasses.iter().map(|s| s.replace('/', ".")).collect();

        for field in self.fields {
            let mut converted = JavaField::new(
                field.name,
                parse_java_type(&field.descriptor, field.signature.as_deref())?,
                field.access,
            );
            converted.annotations = convert_annotations(field.annotations)?;
            converted.nullable = field.nullable;
            converted.has_default = field.has_default;
            class.fields.push(converted);
        }

        for method in self.methods {
            class.methods.push(convert_method(&name, method)?);
        }

        for component in self.record_components {
            class.record_components.push(JavaRecordComponent {
                ty: parse_java_type(&component.descriptor, component.signature.as_deref())?,
                name: component.name,
                annotations: convert_annotations(component.annotations)?,
            });
        }

        Ok(class)
    }
}

fn convert_method(class_name: &str, record: MethodRecord) -> Result<JavaMethod> {
    let signature = parse_method_signature(&record.descriptor, record.signature.as_deref())?;

    if record.parameters.len() > signature.parameter_types.len() {
        return Err(TranslationError::InvalidClassRecord {
            class: class_name.to_string(),
            message: format!(
                "method {} lists {} parameters but its descriptor has {}",
                record.name,
                record.parameters.len(),
                signature.parameter_types.len()
            ),
        });
    }

    let mut parameter_records = record.parameters.into_iter();
    let mut parameters = Vec::with_capacity(signature.parameter_types.len());
    for ty in signature.parameter_types {
        let info = parameter_records.next().unwrap_or_default();
        parameters.push(JavaParameter {
            name: info.name,
            ty,
            annotations: convert_annotations(info.annotations)?,
        });
    }

    let mut method = JavaMethod::new(record.name, signature.return_type, record.access);
    method.descriptor = record.descriptor;
    method.parameters = parameters;
    method.schema = signature.schema;
    method.annotations = convert_annotations(record.annotations)?;
    Ok(method)
}

impl ClassCollection {
    /// Reads a JSON array of class records.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<ClassRecord> = serde_json::from_str(json)?;
        let mut collection = ClassCollection::new();
        for record in records {
            collection.add(record.into_class()?);
        }
        Ok(collection)
    }

    /// Reads a single JSON file, or every `*.json` file of a directory in name order.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut collection = ClassCollection::new();

        let files = if path.is_dir() {
            let mut files: Vec<_> = fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            files.sort();
            files
        } else {
            vec![path.to_path_buf()]
        };

        for file in &files {
            debug!(file = %file.display(), "Reading class records");
            let content = fs::read_to_string(file)?;
            let records: Vec<ClassRecord> = serde_json::from_str(&content)?;
            for record in records {
                collection.add(record.into_class()?);
            }
        }

        let duplicates = collection.duplicate_class_names();
        if !duplicates.is_empty() {
            warn!(
                count = duplicates.len(),
                "There were classes with multiple definitions. Ignoring duplicate definitions."
            );
            debug!(classes = ?duplicates, "Classes with multiple definitions");
        }

        info!(classes = collection.len(), files = files.len(), "Loaded class records");
        Ok(collection)
    }
}
