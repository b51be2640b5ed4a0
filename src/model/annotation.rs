use std::fmt;
use indexmap::IndexMap;
use serde::Serialize;

use crate::core::types::JavaType;

/// Reference to an enum constant, as stored in annotation attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EnumValue {
    pub enum_type: JavaType,
    pub constant: String,
}

impl EnumValue {
    pub fn new(enum_type: JavaType, constant: impl Into<String>) -> Self {
        Self { enum_type, constant: constant.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Class(JavaType),
    Enum(EnumValue),
    Annotation(JavaAnnotation),
    Array(Vec<AnnotationValue>),
}

impl AnnotationValue {
    /// The value itself, or the only element of a single-element array.
    pub fn scalar(&self) -> Option<&AnnotationValue> {
        match self {
            AnnotationValue::Array(values) if values.len() == 1 => Some(&values[0]),
            AnnotationValue::Array(_) => None,
            other => Some(other),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.scalar()? {
            AnnotationValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.scalar()? {
            AnnotationValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&JavaType> {
        match self.scalar()? {
            AnnotationValue::Class(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self.scalar()? {
            AnnotationValue::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&JavaAnnotation> {
        match self.scalar()? {
            AnnotationValue::Annotation(a) => Some(a),
            _ => None,
        }
    }

    /// Array elements; a scalar is treated as a single-element array.
    pub fn elements(&self) -> Vec<&AnnotationValue> {
        match self {
            AnnotationValue::Array(values) => values.iter().collect(),
            other => vec![other],
        }
    }
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationValue::Bool(b) => write!(f, "{}", b),
            AnnotationValue::Int(i) => write!(f, "{}", i),
            AnnotationValue::Float(x) => write!(f, "{}", x),
            AnnotationValue::String(s) => write!(f, "{:?}", s),
            AnnotationValue::Class(ty) => write!(f, "{}.class", ty),
            AnnotationValue::Enum(e) => write!(f, "{}.{}", e.enum_type, e.constant),
            AnnotationValue::Annotation(a) => write!(f, "{}", a),
            AnnotationValue::Array(values) => {
                write!(f, "{{")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// A literal annotation: type name plus explicitly given attributes in source order.
///
/// Defaults declared on the annotation type are not materialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JavaAnnotation {
    name: String,
    attributes: IndexMap<String, AnnotationValue>,
}

impl JavaAnnotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: AnnotationValue) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: AnnotationValue) {
        self.attributes.insert(name.into(), value);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AnnotationValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_attribute(&self, name: &str) -> Option<&AnnotationValue> {
        self.attributes.get(name)
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get_attribute(name)?.as_str()
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get_attribute(name)?.as_bool()
    }

    pub fn get_class(&self, name: &str) -> Option<&JavaType> {
        self.get_attribute(name)?.as_class()
    }

    pub fn get_enum(&self, name: &str) -> Option<&EnumValue> {
        self.get_attribute(name)?.as_enum()
    }

    pub fn get_annotation(&self, name: &str) -> Option<&JavaAnnotation> {
        self.get_attribute(name)?.as_annotation()
    }

    pub fn get_array(&self, name: &str) -> Vec<&AnnotationValue> {
        self.get_attribute(name).map(|v| v.elements()).unwrap_or_default()
    }
}

impl fmt::Display for JavaAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if !self.attributes.is_empty() {
            write!(f, "(")?;
            for (i, (k, v)) in self.attributes.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}={}", k, v)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Classes and their members that carry literal annotations.
pub trait AnnotatedElement {
    fn annotations(&self) -> &[JavaAnnotation];

    fn find_annotation(&self, name: &str) -> Option<&JavaAnnotation> {
        self.annotations().iter().find(|a| a.name() == name)
    }

    fn has_annotation(&self, name: &str) -> bool {
        self.find_annotation(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_element_array_is_unwrapped() {
        let ann = JavaAnnotation::new("org.springframework.web.bind.annotation.RequestMapping")
            .with_attribute("path", AnnotationValue::Array(vec![AnnotationValue::String("/api".into())]));

        assert_eq!(ann.get_string("path"), Some("/api"));
        assert_eq!(ann.get_array("path").len(), 1);
    }

    #[test]
    fn test_multi_element_array_is_not_a_scalar() {
        let ann = JavaAnnotation::new("x.Y").with_attribute(
            "value",
            AnnotationValue::Array(vec![AnnotationValue::String("a".into()), AnnotationValue::String("b".into())]),
        );

        assert_eq!(ann.get_string("value"), None);
        assert_eq!(ann.get_array("value").len(), 2);
        assert!(ann.get_array("missing").is_empty());
    }

    #[test]
    fn test_attributes_keep_insertion_order() {
        let ann = JavaAnnotation::new("x.Y")
            .with_attribute("zeta", AnnotationValue::Int(1))
            .with_attribute("alpha", AnnotationValue::Bool(true));

        let names: Vec<_> = ann.attributes().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(ann.to_string(), "@x.Y(zeta=1, alpha=true)");
    }
}
