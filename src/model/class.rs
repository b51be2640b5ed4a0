use std::fmt;

use crate::core::types::{self, JavaType, TypeEnvironment, TypeSchema};
use crate::model::annotation::{AnnotatedElement, JavaAnnotation};

/// JVM access flags, as found in class files.
pub mod access {
    pub const ACC_PUBLIC: u16 = 0x0001;
    pub const ACC_PRIVATE: u16 = 0x0002;
    pub const ACC_PROTECTED: u16 = 0x0004;
    pub const ACC_STATIC: u16 = 0x0008;
    pub const ACC_FINAL: u16 = 0x0010;
    pub const ACC_TRANSIENT: u16 = 0x0080;
    pub const ACC_SYNTHETIC: u16 = 0x1000;
    pub const ACC_INTERFACE: u16 = 0x0200;
    pub const ACC_ABSTRACT: u16 = 0x0400;
    pub const ACC_ANNOTATION: u16 = 0x2000;
    pub const ACC_ENUM: u16 = 0x4000;
}

use access::*;

#[derive(Debug, Clone, PartialEq)]
pub struct JavaField {
    pub name: String,
    pub ty: JavaType,
    pub access: u16,
    pub annotations: Vec<JavaAnnotation>,
    /// Declared with a nullable type by the source language
    pub nullable: bool,
    /// Has an initializer or a default constructor argument
    pub has_default: bool,
}

impl JavaField {
    pub fn new(name: impl Into<String>, ty: JavaType, access: u16) -> Self {
        Self {
            name: name.into(),
            ty,
            access,
            annotations: Vec::new(),
            nullable: false,
            has_default: false,
        }
    }

    pub fn is_public(&self) -> bool {
        self.access & ACC_PUBLIC != 0
    }

    pub fn is_static(&self) -> bool {
        self.access & ACC_STATIC != 0
    }

    pub fn is_transient(&self) -> bool {
        self.access & ACC_TRANSIENT != 0
    }

    pub fn is_synthetic(&self) -> bool {
        self.access & ACC_SYNTHETIC != 0
    }

    pub fn is_enum_constant(&self) -> bool {
        self.access & ACC_ENUM != 0
    }
}

impl AnnotatedElement for JavaField {
    fn annotations(&self) -> &[JavaAnnotation] {
        &self.annotations
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JavaParameter {
    /// Absent unless the class was compiled with parameter names
    pub name: Option<String>,
    pub ty: JavaType,
    pub annotations: Vec<JavaAnnotation>,
}

impl JavaParameter {
    pub fn new(name: Option<&str>, ty: JavaType) -> Self {
        Self {
            name: name.map(str::to_string),
            ty,
            annotations: Vec::new(),
        }
    }
}

impl AnnotatedElement for JavaParameter {
    fn annotations(&self) -> &[JavaAnnotation] {
        &self.annotations
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JavaMethod {
    pub name: String,
    pub descriptor: String,
    pub return_type: JavaType,
    pub parameters: Vec<JavaParameter>,
    pub access: u16,
    pub schema: TypeSchema,
    pub annotations: Vec<JavaAnnotation>,
}

impl JavaMethod {
    pub fn new(name: impl Into<String>, return_type: JavaType, access: u16) -> Self {
        Self {
            name: name.into(),
            descriptor: String::new(),
            return_type,
            parameters: Vec::new(),
            access,
            schema: TypeSchema::new(),
            annotations: Vec::new(),
        }
    }

    pub fn is_public(&self) -> bool {
        self.access & ACC_PUBLIC != 0
    }

    pub fn is_static(&self) -> bool {
        self.access & ACC_STATIC != 0
    }

    /// `getX()` or, with a primitive boolean result, `isX()`; no parameters, not static.
    pub fn is_getter(&self) -> bool {
        if self.is_static() || !self.parameters.is_empty() {
            return false;
        }
        match self.property_name() {
            Some(_) if self.name.starts_with("get") => true,
            Some(_) => self.return_type.is_basic("boolean"),
            None => false,
        }
    }

    /// Property name for a getter-shaped name.
    ///
    /// Getters of inline value classes carry a mangled `-hash` suffix which is
    /// dropped first.
    pub fn property_name(&self) -> Option<String> {
        property_name_for_getter(&self.name)
    }

    /// Environment of the method body: the owning class' variables, then the method's own.
    pub fn environment(&self, owner: &JavaClass) -> TypeEnvironment {
        TypeEnvironment::from_schemas(&owner.schema, &self.schema)
    }
}

impl AnnotatedElement for JavaMethod {
    fn annotations(&self) -> &[JavaAnnotation] {
        &self.annotations
    }
}

impl fmt::Display for JavaMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.return_type, self.name)?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p.ty)?;
            if let Some(name) = &p.name {
                write!(f, " {}", name)?;
            }
        }
        write!(f, ")")
    }
}

pub fn property_name_for_getter(getter: &str) -> Option<String> {
    let simple = getter.split('-').next().unwrap_or(getter);
    let rest = simple
        .strip_prefix("get")
        .or_else(|| simple.strip_prefix("is"))?;

    let mut chars = rest.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().chain(chars).collect())
}

#[derive(Debug, Clone, PartialEq)]
pub struct JavaRecordComponent {
    pub name: String,
    pub ty: JavaType,
    pub annotations: Vec<JavaAnnotation>,
}

impl AnnotatedElement for JavaRecordComponent {
    fn annotations(&self) -> &[JavaAnnotation] {
        &self.annotations
    }
}

/// All facts read about one class.
#[derive(Debug, Clone, PartialEq)]
pub struct JavaClass {
    pub ty: JavaType,
    pub superclass: Option<JavaType>,
    pub interfaces: Vec<JavaType>,
    pub access: u16,
    pub schema: TypeSchema,
    pub fields: Vec<JavaField>,
    pub methods: Vec<JavaMethod>,
    pub annotations: Vec<JavaAnnotation>,
    pub record_components: Vec<JavaRecordComponent>,
    /// Names of permitted direct subclasses when the class is sealed
    pub permitted_subclasses: Vec<String>,
}

impl JavaClass {
    pub fn new(name: impl Into<String>, access: u16) -> Self {
        Self {
            ty: JavaType::Basic(name.into()),
            superclass: Some(JavaType::object()),
            interfaces: Vec::new(),
            access,
            schema: TypeSchema::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
            record_components: Vec::new(),
            permitted_subclasses: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.ty.as_basic().unwrap_or_default()
    }

    pub fn simple_name(&self) -> &str {
        let name = self.name();
        let start = name.rfind(['.', '$']).map(|i| i + 1).unwrap_or(0);
        &name[start..]
    }

    pub fn package_name(&self) -> &str {
        types::package_name_of(self.name())
    }

    pub fn is_interface(&self) -> bool {
        self.access & ACC_INTERFACE != 0
    }

    pub fn is_annotation(&self) -> bool {
        self.access & ACC_ANNOTATION != 0
            || (self.is_interface() && self.interfaces.iter().any(|i| i.is_basic(types::ANNOTATION)))
    }

    pub fn is_enum(&self) -> bool {
        self.access & ACC_ENUM != 0
    }

    pub fn is_record(&self) -> bool {
        self.superclass.as_ref().is_some_and(|s| s.is_basic(types::RECORD))
    }

    pub fn is_sealed(&self) -> bool {
        !self.permitted_subclasses.is_empty()
    }

    /// Constant names in declaration order; empty for non-enums.
    pub fn enum_constants(&self) -> Vec<String> {
        if !self.is_enum() {
            return Vec::new();
        }
        self.fields
            .iter()
            .filter(|f| f.is_enum_constant())
            .map(|f| f.name.clone())
            .collect()
    }

    pub fn public_methods(&self) -> impl Iterator<Item = &JavaMethod> {
        self.methods.iter().filter(|m| m.is_public())
    }

    pub fn getters(&self) -> impl Iterator<Item = &JavaMethod> {
        self.public_methods().filter(|m| m.is_getter())
    }

    pub fn public_instance_fields(&self) -> impl Iterator<Item = &JavaField> {
        self.fields.iter().filter(|f| f.is_public() && !f.is_static())
    }

    pub fn find_field(&self, name: &str) -> Option<&JavaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn find_method(&self, name: &str) -> Option<&JavaMethod> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn find_method_with_annotation(&self, annotation: &str) -> Option<&JavaMethod> {
        self.methods.iter().find(|m| m.has_annotation(annotation))
    }
}

impl AnnotatedElement for JavaClass {
    fn annotations(&self) -> &[JavaAnnotation] {
        &self.annotations
    }
}

impl fmt::Display for JavaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty)
    }
}
