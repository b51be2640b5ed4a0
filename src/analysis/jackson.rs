//! Jackson bean translation
//!
//! Properties come from record components, getters and public instance
//! fields, walking the class hierarchy upwards so that the most-derived
//! declaration of a name wins. `@JsonIgnore`, `transient` and the external
//! transient markers hide properties, `@JsonUnwrapped` inlines the properties
//! of another class, and `@JsonTypeInfo` with named subtypes produces a
//! discriminated union.

use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use crate::analysis::translator::{ClassStrategy, TypeTranslator};
use crate::api::{ApiType, ApiTypeName, ClassDefinition, DiscriminatedUnionDefinition, EnumDefinition, PropertyDefinition};
use crate::core::types::{JavaType, TypeEnvironment};
use crate::errors::{Result, TranslationError};
use crate::model::annotation::{AnnotatedElement, JavaAnnotation};
use crate::model::class::JavaClass;
use crate::model::loader::BoundClass;

pub const JSON_IGNORE: &str = "com.fasterxml.jackson.annotation.JsonIgnore";
pub const JSON_UNWRAPPED: &str = "com.fasterxml.jackson.annotation.JsonUnwrapped";
pub const JSON_TYPE_INFO: &str = "com.fasterxml.jackson.annotation.JsonTypeInfo";
pub const JSON_SUB_TYPES: &str = "com.fasterxml.jackson.annotation.JsonSubTypes";
pub const JSON_TYPE_NAME: &str = "com.fasterxml.jackson.annotation.JsonTypeName";

const EXTERNAL_TRANSIENT: &[&str] = &[
    "java.beans.Transient",
    "org.springframework.data.annotation.Transient",
];

/// Default strategy for classes serialized by Jackson.
pub struct BeanStrategy;

impl ClassStrategy for BeanStrategy {
    fn supports(&self, _class: &JavaClass) -> bool {
        true
    }

    #[instrument(skip(self, translator, class), fields(class = class.name()))]
    fn translate_class<'m>(
        &self,
        translator: &mut TypeTranslator<'m>,
        class: &'m JavaClass,
        name: ApiTypeName,
    ) -> Result<ApiType> {
        let reference = ApiType::Class(name.clone());
        if translator.api().contains_type(&name) {
            return Ok(reference);
        }

        if class.is_enum() {
            debug!(constants = class.enum_constants().len(), "Translating enum");
            translator
                .api_mut()
                .add_enum_definition(EnumDefinition::new(name, class.enum_constants()))?;
        } else if let Some(type_info) = class.find_annotation(JSON_TYPE_INFO) {
            create_discriminated_union(translator, class, name, type_info)?;
        } else {
            translator
                .api_mut()
                .add_class_definition(ClassDefinition::new(name.clone()))?;
            let mut definition = ClassDefinition::new(name);
            init_class_definition(translator, &mut definition, BoundClass::unbound(class), "", "")?;
            debug!(properties = definition.property_count(), "Translated class");
            translator.api_mut().complete_class_definition(definition)?;
        }
        Ok(reference)
    }
}

fn create_discriminated_union<'m>(
    translator: &mut TypeTranslator<'m>,
    class: &'m JavaClass,
    name: ApiTypeName,
    type_info: &JavaAnnotation,
) -> Result<()> {
    let unsupported = |reason: &str| TranslationError::UnsupportedUnion {
        class: class.name().to_string(),
        reason: reason.to_string(),
    };

    match type_info.get_enum("use").map(|e| e.constant.as_str()) {
        Some("NAME") => {}
        Some(other) => return Err(unsupported(&format!("type id use {} is not NAME", other))),
        None => return Err(unsupported("type id use is not specified")),
    }
    match type_info.get_enum("include").map(|e| e.constant.as_str()) {
        None | Some("PROPERTY") => {}
        Some(other) => return Err(unsupported(&format!("type id inclusion {} is not PROPERTY", other))),
    }
    let discriminator = match type_info.get_string("property") {
        Some(property) if !property.is_empty() => property,
        _ => return Err(unsupported("discriminator property is not specified")),
    };

    translator
        .api_mut()
        .add_discriminated_union(DiscriminatedUnionDefinition::new(name.clone(), discriminator))?;

    let mut union = DiscriminatedUnionDefinition::new(name, discriminator);
    for (value, subtype) in find_subtypes(translator, class)? {
        let model = translator.model();
        let Some(subclass) = model.find_class_for_type(&subtype) else {
            warn!(union = class.name(), subtype = %subtype, "Subtype not loaded, skipping");
            continue;
        };
        let mut definition = ClassDefinition::new(translator.class_name_for_type(subclass.name())?);
        init_class_definition(translator, &mut definition, BoundClass::unbound(subclass), "", "")?;
        union.add_type(value, definition)?;
    }

    debug!(union = %union.name, cases = union.types().len(), "Translated discriminated union");
    translator.api_mut().complete_discriminated_union(union)
}

/// Discriminator values and the subtypes they select.
///
/// Listed by `@JsonSubTypes` when present, otherwise the direct subclasses in
/// the same package. Each value comes from the listing or the subtype's `@JsonTypeName`.
fn find_subtypes(translator: &TypeTranslator<'_>, class: &JavaClass) -> Result<Vec<(String, JavaType)>> {
    let model = translator.model();
    let missing_name = |subtype: &str| TranslationError::MissingSubtypeName {
        union: class.name().to_string(),
        subtype: subtype.to_string(),
    };
    let type_name_of = |subtype: &JavaType| {
        model
            .find_class_for_type(subtype)
            .and_then(|c| c.find_annotation(JSON_TYPE_NAME))
            .and_then(|a| a.get_string("value"))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let mut result = Vec::new();
    if let Some(sub_types) = class.find_annotation(JSON_SUB_TYPES) {
        for entry in sub_types.get_array("value").into_iter().filter_map(|v| v.as_annotation()) {
            let Some(subtype) = entry.get_class("value") else {
                continue;
            };
            let value = entry
                .get_string("name")
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .or_else(|| type_name_of(subtype))
                .ok_or_else(|| missing_name(&subtype.to_string()))?;
            result.push((value, subtype.clone()));
        }
    } else {
        for subclass in model.find_direct_subclasses_in_same_package(class) {
            let subtype = subclass.ty.clone();
            let value = type_name_of(&subtype).ok_or_else(|| missing_name(subclass.name()))?;
            result.push((value, subtype));
        }
    }
    Ok(result)
}

/// Adds the properties of `bound` and its ancestors to `definition`.
///
/// Property names get `prefix` and `suffix`, which accumulate through nested
/// `@JsonUnwrapped` members.
pub(crate) fn init_class_definition<'m>(
    translator: &mut TypeTranslator<'m>,
    definition: &mut ClassDefinition,
    bound: BoundClass<'m>,
    prefix: &str,
    suffix: &str,
) -> Result<()> {
    let model = translator.model();
    let hierarchy = model.classes_upwards_from(bound)?;
    let ignored = ignored_properties(&hierarchy);

    let mut context = PropertyContext {
        definition,
        ignored: &ignored,
        prefix,
        suffix,
    };
    for level in &hierarchy {
        let env = &level.environment;
        for component in &level.class.record_components {
            context.process_property(translator, &component.name, &component.ty, component, env)?;
        }
        for getter in level.class.getters() {
            if let Some(name) = getter.property_name() {
                context.process_property(translator, &name, &getter.return_type, getter, env)?;
            }
        }
        for field in level.class.public_instance_fields() {
            context.process_property(translator, &field.name, &field.ty, field, env)?;
        }
    }
    Ok(())
}

struct PropertyContext<'d> {
    definition: &'d mut ClassDefinition,
    ignored: &'d HashSet<String>,
    prefix: &'d str,
    suffix: &'d str,
}

impl PropertyContext<'_> {
    fn process_property<'m>(
        &mut self,
        translator: &mut TypeTranslator<'m>,
        name: &str,
        ty: &JavaType,
        element: &(impl AnnotatedElement + ?Sized),
        env: &TypeEnvironment,
    ) -> Result<()> {
        if let Some(unwrapped) = element.find_annotation(JSON_UNWRAPPED) {
            if unwrapped.get_bool("enabled") != Some(false) {
                return self.unwrap_property(translator, name, ty, unwrapped, env);
            }
        }

        let property_name = format!("{}{}{}", self.prefix, name, self.suffix);
        if self.definition.has_property(&property_name) || self.ignored.contains(name) {
            return Ok(());
        }

        let property_type = translator.translate_element_type(ty, element, env)?;
        self.definition
            .add_property(PropertyDefinition::new(property_name, property_type))
    }

    fn unwrap_property<'m>(
        &mut self,
        translator: &mut TypeTranslator<'m>,
        name: &str,
        ty: &JavaType,
        unwrapped: &JavaAnnotation,
        env: &TypeEnvironment,
    ) -> Result<()> {
        let model = translator.model();
        let Some(target) = model.bound_class_for(&ty.resolve(env), env)? else {
            warn!(property = name, ty = %ty, "Unwrapped property type not loaded, skipping");
            return Ok(());
        };

        let prefix = format!("{}{}", unwrapped.get_string("prefix").unwrap_or_default(), self.prefix);
        let suffix = format!("{}{}", self.suffix, unwrapped.get_string("suffix").unwrap_or_default());
        debug!(property = name, class = target.class.name(), "Unwrapping property");
        init_class_definition(translator, self.definition, target, &prefix, &suffix)
    }
}

/// Property names hidden for a hierarchy; the most-derived explicit statement wins.
fn ignored_properties(hierarchy: &[BoundClass<'_>]) -> HashSet<String> {
    let mut ignored = HashSet::new();
    let mut apply = |name: &str, ignore: Option<bool>| match ignore {
        Some(true) => {
            ignored.insert(name.to_string());
        }
        Some(false) => {
            ignored.remove(name);
        }
        None => {}
    };

    for level in hierarchy.iter().rev() {
        let class = level.class;
        for component in &class.record_components {
            apply(&component.name, ignore_marker(component));
        }
        for field in class.public_instance_fields() {
            let statement = match ignore_marker(field) {
                Some(ignore) => Some(ignore),
                None if field.is_transient() || has_external_transient(field) => Some(true),
                None => None,
            };
            apply(&field.name, statement);
        }
        for getter in class.getters() {
            let Some(name) = getter.property_name() else {
                continue;
            };
            let field = class.find_field(&name);
            let statement = match ignore_marker(getter).or_else(|| field.and_then(ignore_marker)) {
                Some(ignore) => Some(ignore),
                None if has_external_transient(getter)
                    || field.is_some_and(|f| f.is_transient() || has_external_transient(f)) =>
                {
                    Some(true)
                }
                None => None,
            };
            apply(&name, statement);
        }
    }
    ignored
}

/// `Some(true)` for `@JsonIgnore`, `Some(false)` for `@JsonIgnore(false)`.
fn ignore_marker(element: &(impl AnnotatedElement + ?Sized)) -> Option<bool> {
    element
        .find_annotation(JSON_IGNORE)
        .map(|a| a.get_bool("value").unwrap_or(true))
}

fn has_external_transient(element: &(impl AnnotatedElement + ?Sized)) -> bool {
    EXTERNAL_TRANSIENT.iter().any(|name| element.has_annotation(name))
}
