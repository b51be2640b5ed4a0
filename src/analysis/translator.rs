//! Java type to API type translation
//!
//! [`TypeTranslator`] owns the [`ApiDefinition`] under construction. Class
//! types are elaborated on first sight by one of the class strategies and
//! registered under their display name; every later reference, including
//! recursive ones met while the class is still being populated, only yields
//! a `Class` reference.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use tracing::{debug, trace};

use crate::analysis::annotations::AnnotationResolver;
use crate::analysis::jackson::BeanStrategy;
use crate::analysis::serialization::SerializationStrategy;
use crate::analysis::settings::TranslationSettings;
use crate::api::{ApiDefinition, ApiType, ApiTypeName};
use crate::core::types::{self, JavaType, TypeEnvironment};
use crate::errors::{Result, TranslationError};
use crate::model::annotation::AnnotatedElement;
use crate::model::class::JavaClass;
use crate::model::loader::JavaModel;

pub const JSON_VALUE: &str = "com.fasterxml.jackson.annotation.JsonValue";

static NULLABLE_ANNOTATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "org.jetbrains.annotations.Nullable",
        "javax.annotation.Nullable",
        "javax.annotation.CheckForNull",
        "jakarta.annotation.Nullable",
        "edu.umd.cs.findbugs.annotations.Nullable",
        "android.support.annotation.Nullable",
        "androidx.annotation.Nullable",
        "androidx.annotation.RecentlyNullable",
        "org.checkerframework.checker.nullness.qual.Nullable",
        "org.checkerframework.checker.nullness.compatqual.NullableDecl",
        "org.checkerframework.checker.nullness.compatqual.NullableType",
        "org.springframework.lang.Nullable",
    ]
    .into_iter()
    .collect()
});

/// Whether `element` carries one of the recognized nullability markers directly.
pub fn has_nullable_annotation(element: &(impl AnnotatedElement + ?Sized)) -> bool {
    element
        .annotations()
        .iter()
        .any(|a| NULLABLE_ANNOTATIONS.contains(a.name()))
}

/// How a family of classes is turned into API definitions.
pub trait ClassStrategy {
    fn supports(&self, class: &JavaClass) -> bool;

    /// Registers whatever `class` translates to and returns the reference to it.
    fn translate_class<'m>(
        &self,
        translator: &mut TypeTranslator<'m>,
        class: &'m JavaClass,
        name: ApiTypeName,
    ) -> Result<ApiType>;
}

pub struct TypeTranslator<'m> {
    settings: &'m TranslationSettings,
    model: &'m JavaModel,
    resolver: AnnotationResolver<'m>,
    api: ApiDefinition,
    /// Display name to the qualified name that claimed it
    translated_names: HashMap<String, String>,
    /// Variables currently being chased, innermost last
    resolving: Vec<String>,
}

impl<'m> TypeTranslator<'m> {
    pub fn new(settings: &'m TranslationSettings, model: &'m JavaModel) -> Self {
        debug!("Creating new TypeTranslator");
        Self {
            settings,
            model,
            resolver: AnnotationResolver::new(model),
            api: ApiDefinition::new(),
            translated_names: HashMap::new(),
            resolving: Vec::new(),
        }
    }

    pub fn model(&self) -> &'m JavaModel {
        self.model
    }

    pub fn settings(&self) -> &'m TranslationSettings {
        self.settings
    }

    pub fn resolver(&self) -> AnnotationResolver<'m> {
        self.resolver
    }

    pub fn api(&self) -> &ApiDefinition {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut ApiDefinition {
        &mut self.api
    }

    pub fn into_api(self) -> ApiDefinition {
        self.api
    }

    /// Translates the type of a field, getter, parameter or record component.
    ///
    /// The result is made nullable when the element carries a nullability marker.
    pub fn translate_element_type(
        &mut self,
        ty: &JavaType,
        element: &(impl AnnotatedElement + ?Sized),
        env: &TypeEnvironment,
    ) -> Result<ApiType> {
        let translated = self.translate_type(ty, env)?;
        if has_nullable_annotation(element) {
            Ok(translated.nullable())
        } else {
            Ok(translated)
        }
    }

    pub fn translate_type(&mut self, ty: &JavaType, env: &TypeEnvironment) -> Result<ApiType> {
        trace!(ty = %ty, "Translating type");
        match ty {
            JavaType::Basic(name) => self.translate_basic_type(name, ty),
            JavaType::Parameterized { base, arguments } => self.translate_parameterized_type(base, arguments, env),
            JavaType::Array(element) => Ok(ApiType::array(self.translate_type(element, env)?)),
            JavaType::Variable(name) => self.translate_variable(name, ty, env),
            JavaType::Wildcard { upper_bound, lower_bound } => match lower_bound.as_deref().or(upper_bound.as_deref()) {
                Some(bound) => self.translate_type(bound, env),
                None => Ok(ApiType::ANY),
            },
            JavaType::InnerClass { .. } => Err(TranslationError::UnsupportedType {
                kind: "inner class",
                ty: ty.to_string(),
            }),
        }
    }

    fn translate_basic_type(&mut self, name: &str, ty: &JavaType) -> Result<ApiType> {
        let model = self.model;
        let translated = if model.is_instance_of(ty, types::COLLECTION) {
            ApiType::array(ApiType::ANY)
        } else if model.is_instance_of(ty, types::MAP) {
            ApiType::dictionary(ApiType::ANY)
        } else if name == types::STRING || name == "char" || name == "java.lang.Character" {
            ApiType::STRING
        } else if model.is_integral(ty) {
            ApiType::INTEGER
        } else if model.is_number(ty) {
            ApiType::FLOAT
        } else if name == "boolean" || name == types::BOOLEAN_BOXED {
            ApiType::BOOLEAN
        } else if name == types::OPTIONAL_INT || name == types::OPTIONAL_LONG {
            ApiType::INTEGER.nullable()
        } else if name == types::OPTIONAL_DOUBLE {
            ApiType::FLOAT.nullable()
        } else if name == types::OBJECT {
            ApiType::ANY
        } else if ty.is_void() || name == "java.lang.Void" {
            ApiType::VOID
        } else {
            return self.translate_class_type(name);
        };
        Ok(translated)
    }

    fn translate_parameterized_type(
        &mut self,
        base: &JavaType,
        arguments: &[JavaType],
        env: &TypeEnvironment,
    ) -> Result<ApiType> {
        let args = arguments
            .iter()
            .map(|a| self.translate_type(a, env))
            .collect::<Result<Vec<_>>>()?;

        let model = self.model;
        match args.as_slice() {
            [element] if model.is_instance_of(base, types::COLLECTION) => Ok(ApiType::array(element.clone())),
            [key, value] if *key == ApiType::STRING && model.is_instance_of(base, types::MAP) => {
                Ok(ApiType::dictionary(value.clone()))
            }
            [value] if model.is_instance_of(base, types::OPTIONAL) => Ok(value.clone().nullable()),
            _ => self.translate_type(base, env),
        }
    }

    fn translate_variable(&mut self, name: &str, ty: &JavaType, env: &TypeEnvironment) -> Result<ApiType> {
        let Some(bound) = env.lookup(name) else {
            return Ok(ApiType::ANY);
        };
        if bound == ty {
            return Err(TranslationError::SelfReferentialBinding {
                variable: name.to_string(),
                environment: env.to_string(),
            });
        }
        // Bounds like `T extends Comparable<T>` lead back to the variable itself.
        if self.resolving.iter().any(|v| v == name) {
            debug!(variable = name, "Recursive type variable, translating as any");
            return Ok(ApiType::ANY);
        }

        self.resolving.push(name.to_string());
        let result = self.translate_type(bound, env);
        self.resolving.pop();
        result
    }

    fn translate_class_type(&mut self, qualified_name: &str) -> Result<ApiType> {
        let name = self.class_name_for_type(qualified_name)?;

        if self.settings.is_imported(&name) {
            return Ok(ApiType::BlackBox(name));
        }

        if self.settings.is_black_box_class(qualified_name) {
            debug!(class = qualified_name, "Translating as black box");
            self.api.add_black_box(name.clone());
            return Ok(ApiType::BlackBox(name));
        }

        let model = self.model;
        let Some(class) = model.find_class(qualified_name) else {
            debug!(class = qualified_name, "Class not loaded, leaving reference unelaborated");
            return Ok(ApiType::Class(name));
        };

        if let Some(method) = class.find_method_with_annotation(JSON_VALUE) {
            if self.api.type_alias(name.as_str()).is_none() {
                let env = method.environment(class);
                let target = self.translate_type(&method.return_type, &env)?;
                debug!(class = qualified_name, target = %target, "Registering type alias");
                self.api.add_type_alias(name.clone(), target);
            }
            return Ok(ApiType::BlackBox(name));
        }

        if SerializationStrategy.supports(class) {
            SerializationStrategy.translate_class(self, class, name)
        } else {
            BeanStrategy.translate_class(self, class, name)
        }
    }

    /// Display name for a qualified class name, claiming it for that class.
    ///
    /// Two different classes may not share a display name within one run.
    pub fn class_name_for_type(&mut self, qualified_name: &str) -> Result<ApiTypeName> {
        let display_name = self.settings.name_translator.translate_class_name(qualified_name);
        match self.translated_names.get(&display_name) {
            Some(existing) if existing != qualified_name => Err(TranslationError::DuplicateClassName {
                display_name,
                first: existing.clone(),
                second: qualified_name.to_string(),
            }),
            Some(_) => Ok(ApiTypeName::new(display_name)),
            None => {
                self.translated_names
                    .insert(display_name.clone(), qualified_name.to_string());
                Ok(ApiTypeName::new(display_name))
            }
        }
    }
}
