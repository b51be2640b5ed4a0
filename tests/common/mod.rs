//! Class model builders shared by the integration tests.
#![allow(dead_code)]

use apinfer::analysis::{TranslationSettings, TypeTranslator};
use apinfer::api::{ApiDefinition, ApiType};
use apinfer::core::{JavaType, TypeEnvironment};
use apinfer::errors::Result;
use apinfer::model::access::*;
use apinfer::model::{
    AnnotationValue, ClassCollection, EnumValue, JavaAnnotation, JavaClass, JavaField, JavaMethod, JavaModel,
    JavaParameter, JavaRecordComponent,
};

pub const STRING: &str = "java.lang.String";
pub const SPRING_WEB: &str = "org.springframework.web.bind.annotation";
pub const ALIAS_FOR: &str = "org.springframework.core.annotation.AliasFor";

pub fn basic(name: &str) -> JavaType {
    JavaType::basic(name)
}

pub fn generic(base: &str, arguments: Vec<JavaType>) -> JavaType {
    JavaType::parameterized(JavaType::basic(base), arguments)
}

pub fn list_of(element: JavaType) -> JavaType {
    generic("java.util.List", vec![element])
}

pub fn annotation(name: &str) -> JavaAnnotation {
    JavaAnnotation::new(name)
}

pub fn string(value: &str) -> AnnotationValue {
    AnnotationValue::String(value.to_string())
}

pub fn class_value(name: &str) -> AnnotationValue {
    AnnotationValue::Class(JavaType::basic(name))
}

pub fn enum_value(enum_type: &str, constant: &str) -> AnnotationValue {
    AnnotationValue::Enum(EnumValue::new(JavaType::basic(enum_type), constant))
}

pub fn getter(name: &str, ty: JavaType) -> JavaMethod {
    JavaMethod::new(name, ty, ACC_PUBLIC)
}

pub fn public_field(name: &str, ty: JavaType) -> JavaField {
    JavaField::new(name, ty, ACC_PUBLIC)
}

pub fn private_field(name: &str, ty: JavaType) -> JavaField {
    JavaField::new(name, ty, ACC_PRIVATE)
}

pub fn parameter(name: Option<&str>, ty: JavaType, annotations: Vec<JavaAnnotation>) -> JavaParameter {
    let mut parameter = JavaParameter::new(name, ty);
    parameter.annotations = annotations;
    parameter
}

pub fn annotated<T>(mut member: T, annotation: JavaAnnotation) -> T
where
    T: HasAnnotations,
{
    member.annotations_mut().push(annotation);
    member
}

pub trait HasAnnotations {
    fn annotations_mut(&mut self) -> &mut Vec<JavaAnnotation>;
}

impl HasAnnotations for JavaMethod {
    fn annotations_mut(&mut self) -> &mut Vec<JavaAnnotation> {
        &mut self.annotations
    }
}

impl HasAnnotations for JavaField {
    fn annotations_mut(&mut self) -> &mut Vec<JavaAnnotation> {
        &mut self.annotations
    }
}

pub struct ClassBuilder {
    class: JavaClass,
}

impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            class: JavaClass::new(name, ACC_PUBLIC),
        }
    }

    pub fn interface(name: &str) -> Self {
        Self {
            class: JavaClass::new(name, ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT),
        }
    }

    pub fn annotation_type(name: &str) -> Self {
        let mut builder = Self {
            class: JavaClass::new(name, ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT | ACC_ANNOTATION),
        };
        builder.class.interfaces.push(JavaType::basic("java.lang.annotation.Annotation"));
        builder
    }

    pub fn enumeration(name: &str, constants: &[&str]) -> Self {
        let mut builder = Self {
            class: JavaClass::new(name, ACC_PUBLIC | ACC_FINAL | ACC_ENUM),
        };
        builder.class.superclass = Some(generic("java.lang.Enum", vec![JavaType::basic(name)]));
        for constant in constants {
            builder.class.fields.push(JavaField::new(
                *constant,
                JavaType::basic(name),
                ACC_PUBLIC | ACC_STATIC | ACC_FINAL | ACC_ENUM,
            ));
        }
        builder
    }

    pub fn record(name: &str) -> Self {
        Self::new(name).extends(basic("java.lang.Record"))
    }

    pub fn type_parameter(mut self, name: &str) -> Self {
        self.class.schema.add(name).unwrap();
        self
    }

    pub fn extends(mut self, superclass: JavaType) -> Self {
        self.class.superclass = Some(superclass);
        self
    }

    pub fn implements(mut self, interface: JavaType) -> Self {
        self.class.interfaces.push(interface);
        self
    }

    pub fn annotation(mut self, annotation: JavaAnnotation) -> Self {
        self.class.annotations.push(annotation);
        self
    }

    pub fn field(mut self, field: JavaField) -> Self {
        self.class.fields.push(field);
        self
    }

    pub fn method(mut self, method: JavaMethod) -> Self {
        self.class.methods.push(method);
        self
    }

    pub fn getter(self, name: &str, ty: JavaType) -> Self {
        self.method(getter(name, ty))
    }

    pub fn component(mut self, name: &str, ty: JavaType) -> Self {
        self.class.record_components.push(JavaRecordComponent {
            name: name.to_string(),
            ty,
            annotations: Vec::new(),
        });
        self
    }

    pub fn permits(mut self, subclass: &str) -> Self {
        self.class.permitted_subclasses.push(subclass.to_string());
        self
    }

    pub fn build(self) -> JavaClass {
        self.class
    }
}

pub fn model(classes: Vec<JavaClass>) -> JavaModel {
    JavaModel::new(ClassCollection::from_iter(classes))
}

/// Translates a raw class type with a fresh translator.
pub fn translate_class(
    model: &JavaModel,
    settings: &TranslationSettings,
    name: &str,
) -> Result<(ApiType, ApiDefinition)> {
    let mut translator = TypeTranslator::new(settings, model);
    let ty = translator.translate_type(&JavaType::basic(name), &TypeEnvironment::empty())?;
    Ok((ty, translator.into_api()))
}

/// Spring web annotations with the meta-annotations and aliases of the real ones.
pub fn spring_annotations() -> Vec<JavaClass> {
    let attribute = |name: &str, alias: Option<JavaAnnotation>| {
        let mut method = JavaMethod::new(name, basic(STRING), ACC_PUBLIC | ACC_ABSTRACT);
        method.annotations.extend(alias);
        method
    };
    let alias_for = |target: Option<&str>, attribute: &str| {
        let alias = annotation(ALIAS_FOR).with_attribute("attribute", string(attribute));
        match target {
            Some(target) => alias.with_attribute("annotation", class_value(target)),
            None => alias,
        }
    };
    let request_mapping = format!("{}.RequestMapping", SPRING_WEB);

    let mut classes = vec![
        ClassBuilder::annotation_type(&format!("{}.RestController", SPRING_WEB))
            .method(attribute("value", None))
            .build(),
        ClassBuilder::annotation_type(&request_mapping)
            .method(attribute("value", Some(alias_for(None, "path"))))
            .method(attribute("path", Some(alias_for(None, "value"))))
            .method(attribute("method", None))
            .build(),
        ClassBuilder::annotation_type(&format!("{}.RequestBody", SPRING_WEB)).build(),
        ClassBuilder::annotation_type(&format!("{}.RequestParam", SPRING_WEB))
            .method(attribute("value", Some(alias_for(None, "name"))))
            .method(attribute("name", Some(alias_for(None, "value"))))
            .build(),
        ClassBuilder::annotation_type(&format!("{}.PathVariable", SPRING_WEB))
            .method(attribute("value", Some(alias_for(None, "name"))))
            .method(attribute("name", Some(alias_for(None, "value"))))
            .build(),
    ];

    for (name, method) in [("GetMapping", "GET"), ("PostMapping", "POST"), ("DeleteMapping", "DELETE")] {
        classes.push(
            ClassBuilder::annotation_type(&format!("{}.{}", SPRING_WEB, name))
                .annotation(annotation(&request_mapping).with_attribute(
                    "method",
                    AnnotationValue::Array(vec![enum_value(&format!("{}.RequestMethod", SPRING_WEB), method)]),
                ))
                .method(attribute("value", Some(alias_for(Some(&request_mapping), "path"))))
                .method(attribute("path", Some(alias_for(Some(&request_mapping), "path"))))
                .build(),
        );
    }
    classes
}

pub fn spring(name: &str) -> String {
    format!("{}.{}", SPRING_WEB, name)
}
