//! Meta-annotation resolution
//!
//! An element is considered to carry annotation `X` when `X` appears among its
//! literal annotations or anywhere in their implied closure, i.e. the
//! annotations declared on the annotation classes themselves, recursively.
//! Attribute values are read through that closure and through
//! `@AliasFor` declarations, which may redirect an attribute of one
//! annotation to an attribute of another.

use std::collections::{BTreeSet, HashSet};

use crate::core::types::JavaType;
use crate::model::annotation::{AnnotatedElement, AnnotationValue, EnumValue, JavaAnnotation};
use crate::model::class::{JavaClass, JavaMethod};
use crate::model::loader::JavaModel;

pub const ALIAS_FOR: &str = "org.springframework.core.annotation.AliasFor";
const ANNOTATION_BASE: &str = "java.lang.annotation.Annotation";

#[derive(Clone, Copy)]
pub struct AnnotationResolver<'m> {
    model: &'m JavaModel,
}

impl<'m> AnnotationResolver<'m> {
    pub fn new(model: &'m JavaModel) -> Self {
        Self { model }
    }

    /// The first literal annotation of `element` whose implied closure contains `annotation_type`.
    pub fn find_annotation<'a>(
        &self,
        element: &'a (impl AnnotatedElement + ?Sized),
        annotation_type: &str,
    ) -> Option<ResolvedAnnotation<'a>>
    where
        'm: 'a,
    {
        element.annotations().iter().find_map(|annotation| {
            let implied = self.implied_annotations(annotation);
            implied
                .iter()
                .any(|a| a.name() == annotation_type)
                .then(|| ResolvedAnnotation {
                    annotation_type: annotation_type.to_string(),
                    implied,
                    model: self.model,
                })
        })
    }

    pub fn has_annotation(&self, element: &(impl AnnotatedElement + ?Sized), annotation_type: &str) -> bool {
        self.find_annotation(element, annotation_type).is_some()
    }

    /// Loaded classes accepted by `filter` that carry `annotation_type`, directly or through meta-annotations.
    pub fn find_classes_with_annotation(
        &self,
        annotation_type: &str,
        filter: impl Fn(&str) -> bool,
    ) -> Vec<&'m JavaClass> {
        self.model
            .find_classes(filter)
            .into_iter()
            .filter(|class| self.has_annotation(*class, annotation_type))
            .collect()
    }

    /// `annotation` followed by every annotation it implies, depth-first, each type once.
    pub fn implied_annotations<'a>(&self, annotation: &'a JavaAnnotation) -> Vec<&'a JavaAnnotation>
    where
        'm: 'a,
    {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        self.collect_implied(annotation, &mut visited, &mut result);
        result
    }

    fn collect_implied<'a>(
        &self,
        annotation: &'a JavaAnnotation,
        visited: &mut HashSet<&'a str>,
        result: &mut Vec<&'a JavaAnnotation>,
    ) where
        'm: 'a,
    {
        if !visited.insert(annotation.name()) {
            return;
        }
        result.push(annotation);

        let model: &'a JavaModel = self.model;
        if let Some(class) = model.find_class(annotation.name()) {
            for meta in &class.annotations {
                self.collect_implied(meta, visited, result);
            }
        }
    }
}

/// An annotation found through an element's implied closure.
#[derive(Clone)]
pub struct ResolvedAnnotation<'a> {
    annotation_type: String,
    implied: Vec<&'a JavaAnnotation>,
    model: &'a JavaModel,
}

impl<'a> ResolvedAnnotation<'a> {
    pub fn annotation_type(&self) -> &str {
        &self.annotation_type
    }

    /// The literal annotation and its closure, in discovery order.
    pub fn implied(&self) -> &[&'a JavaAnnotation] {
        &self.implied
    }

    /// Value of `attribute` of the resolved annotation type.
    ///
    /// Walks the closure in order. A member of the resolved type answers with
    /// its own value; any other member answers with the value of an attribute
    /// it declares as an alias for the requested one.
    pub fn get_attribute(&self, attribute: &str) -> Option<&'a AnnotationValue> {
        for annotation in &self.implied {
            if annotation.name() == self.annotation_type {
                if let Some(value) = annotation.get_attribute(attribute) {
                    return Some(value);
                }
            }
            for alias in find_aliases(self.model, annotation.name()) {
                if alias.matches(&self.annotation_type, attribute) {
                    if let Some(value) = annotation.get_attribute(&alias.source_attribute) {
                        return Some(value);
                    }
                }
            }
        }
        None
    }

    /// Non-empty string value of `attribute`.
    pub fn get_string(&self, attribute: &str) -> Option<&'a str> {
        self.get_attribute(attribute)
            .and_then(AnnotationValue::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn get_bool(&self, attribute: &str) -> Option<bool> {
        self.get_attribute(attribute).and_then(AnnotationValue::as_bool)
    }

    pub fn get_class(&self, attribute: &str) -> Option<&'a JavaType> {
        self.get_attribute(attribute).and_then(AnnotationValue::as_class)
    }

    /// Enum constants of an array-or-scalar attribute.
    pub fn get_enums(&self, attribute: &str) -> Vec<&'a EnumValue> {
        self.get_attribute(attribute)
            .map(|value| value.elements().into_iter().filter_map(AnnotationValue::as_enum).collect())
            .unwrap_or_default()
    }
}

/// An attribute declared with `@AliasFor`, and every attribute it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasFor {
    pub source_annotation: String,
    pub source_attribute: String,
    targets: BTreeSet<(String, String)>,
}

impl AliasFor {
    pub fn matches(&self, annotation: &str, attribute: &str) -> bool {
        (annotation == self.source_annotation && attribute == self.source_attribute)
            || self
                .targets
                .iter()
                .any(|(a, attr)| a == annotation && attr == attribute)
    }

    pub fn targets(&self) -> impl Iterator<Item = (&str, &str)> {
        self.targets.iter().map(|(a, attr)| (a.as_str(), attr.as_str()))
    }
}

/// Aliases declared by the attributes of `annotation_type`.
pub fn find_aliases(model: &JavaModel, annotation_type: &str) -> Vec<AliasFor> {
    let Some(class) = model.find_class(annotation_type) else {
        return Vec::new();
    };
    class
        .methods
        .iter()
        .filter(|m| m.has_annotation(ALIAS_FOR))
        .map(|method| {
            let mut targets = BTreeSet::new();
            collect_alias_targets(model, class, method, &mut targets);
            AliasFor {
                source_annotation: annotation_type.to_string(),
                source_attribute: method.name.clone(),
                targets,
            }
        })
        .collect()
}

fn collect_alias_targets(
    model: &JavaModel,
    owner: &JavaClass,
    method: &JavaMethod,
    targets: &mut BTreeSet<(String, String)>,
) {
    let Some(alias_for) = method.find_annotation(ALIAS_FOR) else {
        return;
    };

    let target_annotation = alias_for
        .get_class("annotation")
        .and_then(JavaType::non_generic_class_name)
        .filter(|name| name != ANNOTATION_BASE)
        .unwrap_or_else(|| owner.name().to_string());
    let target_attribute = [alias_for.get_string("attribute"), alias_for.get_string("value")]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or(&method.name)
        .to_string();

    let key = (target_annotation, target_attribute);
    if !targets.insert(key.clone()) {
        return;
    }

    let (annotation, attribute) = key;
    if let Some(target_class) = model.find_class(&annotation) {
        if let Some(target) = target_class
            .methods
            .iter()
            .find(|m| m.name == attribute && m.has_annotation(ALIAS_FOR))
        {
            collect_alias_targets(model, target_class, target, targets);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::class::access::{ACC_ABSTRACT, ACC_ANNOTATION, ACC_INTERFACE, ACC_PUBLIC};
    use crate::model::class::JavaParameter;
    use crate::model::loader::ClassCollection;

    const ANNOTATION_ACCESS: u16 = ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT | ACC_ANNOTATION;

    fn annotation_class(name: &str) -> JavaClass {
        let mut class = JavaClass::new(name, ANNOTATION_ACCESS);
        class.interfaces.push(JavaType::basic(ANNOTATION_BASE));
        class
    }

    fn attribute(name: &str, alias: Option<JavaAnnotation>) -> JavaMethod {
        let mut method = JavaMethod::new(name, JavaType::basic("java.lang.String"), ACC_PUBLIC | ACC_ABSTRACT);
        method.annotations.extend(alias);
        method
    }

    fn alias_for(annotation: Option<&str>, attribute: &str) -> JavaAnnotation {
        let mut alias = JavaAnnotation::new(ALIAS_FOR)
            .with_attribute("attribute", AnnotationValue::String(attribute.to_string()));
        if let Some(annotation) = annotation {
            alias.set_attribute("annotation", AnnotationValue::Class(JavaType::basic(annotation)));
        }
        alias
    }

    /// `@Baz` declares `qux`; `@Foo` is meta-annotated with `@Baz` and aliases `bar` to `Baz.qux`.
    fn model() -> JavaModel {
        let mut baz = annotation_class("test.Baz");
        baz.methods.push(attribute("qux", None));

        let mut foo = annotation_class("test.Foo");
        foo.annotations.push(JavaAnnotation::new("test.Baz"));
        foo.methods.push(attribute("bar", Some(alias_for(Some("test.Baz"), "qux"))));

        JavaModel::new(ClassCollection::from_iter([baz, foo]))
    }

    fn annotated(annotations: Vec<JavaAnnotation>) -> JavaParameter {
        let mut parameter = JavaParameter::new(Some("p"), JavaType::basic("java.lang.String"));
        parameter.annotations = annotations;
        parameter
    }

    #[test]
    fn test_meta_annotation_found() {
        let model = model();
        let resolver = AnnotationResolver::new(&model);
        let element = annotated(vec![JavaAnnotation::new("test.Foo")]);

        assert!(resolver.has_annotation(&element, "test.Foo"));
        assert!(resolver.has_annotation(&element, "test.Baz"));
        assert!(!resolver.has_annotation(&element, "test.Other"));
    }

    #[test]
    fn test_find_classes_with_annotation() {
        let model = model();
        let resolver = AnnotationResolver::new(&model);

        let names: Vec<_> = resolver
            .find_classes_with_annotation("test.Baz", |_| true)
            .into_iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(names, vec!["test.Foo"]);
        assert!(resolver.find_classes_with_annotation("test.Baz", |name| name != "test.Foo").is_empty());
    }

    #[test]
    fn test_alias_resolves_to_meta_annotation_attribute() {
        let model = model();
        let resolver = AnnotationResolver::new(&model);
        let element = annotated(vec![JavaAnnotation::new("test.Foo")
            .with_attribute("bar", AnnotationValue::String("v".to_string()))]);

        let baz = resolver.find_annotation(&element, "test.Baz").unwrap();
        assert_eq!(baz.get_string("qux"), Some("v"));
    }

    #[test]
    fn test_direct_attribute_wins() {
        let model = model();
        let resolver = AnnotationResolver::new(&model);
        let element = annotated(vec![JavaAnnotation::new("test.Baz")
            .with_attribute("qux", AnnotationValue::String("direct".to_string()))]);

        let baz = resolver.find_annotation(&element, "test.Baz").unwrap();
        assert_eq!(baz.get_string("qux"), Some("direct"));
    }

    #[test]
    fn test_alias_within_same_annotation() {
        let mut mapping = annotation_class("test.Mapping");
        mapping.methods.push(attribute("value", Some(alias_for(None, "path"))));
        mapping.methods.push(attribute("path", Some(alias_for(None, "value"))));
        let model = JavaModel::new(ClassCollection::new().with_class(mapping));

        let aliases = find_aliases(&model, "test.Mapping");
        assert_eq!(aliases.len(), 2);
        let value = aliases.iter().find(|a| a.source_attribute == "value").unwrap();
        assert!(value.matches("test.Mapping", "path"));
        assert!(value.matches("test.Mapping", "value"));

        let resolver = AnnotationResolver::new(&model);
        let element = annotated(vec![JavaAnnotation::new("test.Mapping")
            .with_attribute("value", AnnotationValue::String("/orders".to_string()))]);
        let resolved = resolver.find_annotation(&element, "test.Mapping").unwrap();
        assert_eq!(resolved.get_string("path"), Some("/orders"));
    }

    #[test]
    fn test_self_annotated_annotation_terminates() {
        let mut documented = annotation_class("test.Documented");
        documented.annotations.push(JavaAnnotation::new("test.Documented"));
        let model = JavaModel::new(ClassCollection::new().with_class(documented));
        let resolver = AnnotationResolver::new(&model);

        let annotation = JavaAnnotation::new("test.Documented");
        assert_eq!(resolver.implied_annotations(&annotation).len(), 1);
    }
}
