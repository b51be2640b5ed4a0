//! kotlinx.serialization translation
//!
//! Classes marked `@Serializable` are described by their backing fields
//! rather than by bean accessors. Sealed classes become discriminated unions
//! tagged with the `type` property.

use tracing::{debug, instrument, warn};

use crate::analysis::translator::{ClassStrategy, TypeTranslator};
use crate::api::{ApiType, ApiTypeName, ClassDefinition, DiscriminatedUnionDefinition, EnumDefinition, PropertyDefinition};
use crate::core::types::TypeEnvironment;
use crate::errors::Result;
use crate::model::annotation::AnnotatedElement;
use crate::model::class::JavaClass;
use crate::model::loader::BoundClass;

pub const SERIALIZABLE: &str = "kotlinx.serialization.Serializable";
pub const SERIAL_NAME: &str = "kotlinx.serialization.SerialName";
pub const TRANSIENT: &str = "kotlinx.serialization.Transient";
pub const REQUIRED: &str = "kotlinx.serialization.Required";

const DISCRIMINATOR: &str = "type";

pub struct SerializationStrategy;

impl ClassStrategy for SerializationStrategy {
    fn supports(&self, class: &JavaClass) -> bool {
        class.has_annotation(SERIALIZABLE)
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
            translator
                .api_mut()
                .add_enum_definition(EnumDefinition::new(name, class.enum_constants()))?;
        } else if class.is_sealed() {
            create_sealed_union(translator, class, name)?;
        } else {
            translator
                .api_mut()
                .add_class_definition(ClassDefinition::new(name.clone()))?;
            let mut definition = ClassDefinition::new(name);
            init_class_definition(translator, &mut definition, class, TypeEnvironment::empty())?;
            translator.api_mut().complete_class_definition(definition)?;
        }
        Ok(reference)
    }
}

fn create_sealed_union<'m>(translator: &mut TypeTranslator<'m>, class: &'m JavaClass, name: ApiTypeName) -> Result<()> {
    translator
        .api_mut()
        .add_discriminated_union(DiscriminatedUnionDefinition::new(name.clone(), DISCRIMINATOR))?;

    let mut union = DiscriminatedUnionDefinition::new(name, DISCRIMINATOR);
    let model = translator.model();
    for subclass_name in &class.permitted_subclasses {
        let Some(subclass) = model.find_class(subclass_name) else {
            warn!(union = class.name(), subclass = subclass_name.as_str(), "Permitted subclass not loaded, skipping");
            continue;
        };
        let value = subclass
            .find_annotation(SERIAL_NAME)
            .and_then(|a| a.get_string("value"))
            .map(str::to_string)
            .unwrap_or_else(|| subclass.name().replace('$', "."));

        let mut definition = ClassDefinition::new(translator.class_name_for_type(subclass.name())?);
        init_class_definition(translator, &mut definition, subclass, TypeEnvironment::empty())?;
        union.add_type(value, definition)?;
    }

    debug!(union = %union.name, cases = union.types().len(), "Translated sealed class");
    translator.api_mut().complete_discriminated_union(union)
}

/// Adds a property for every serialized backing field of `class` and its serializable ancestors.
fn init_class_definition<'m>(
    translator: &mut TypeTranslator<'m>,
    definition: &mut ClassDefinition,
    class: &'m JavaClass,
    env: TypeEnvironment,
) -> Result<()> {
    let model = translator.model();
    for level in model.classes_upwards_from(BoundClass::new(class, env))? {
        if !level.class.has_annotation(SERIALIZABLE) {
            continue;
        }
        let fields = level
            .class
            .fields
            .iter()
            .filter(|f| !f.is_static() && !f.is_synthetic() && !f.has_annotation(TRANSIENT));

        for field in fields {
            let name = field
                .find_annotation(SERIAL_NAME)
                .and_then(|a| a.get_string("value"))
                .unwrap_or(&field.name);
            if definition.has_property(name) {
                continue;
            }

            let mut ty = translator.translate_element_type(&field.ty, field, &level.environment)?;
            if field.nullable || (field.has_default && !field.has_annotation(REQUIRED)) {
                ty = ty.nullable();
            }
            definition.add_property(PropertyDefinition::new(name, ty))?;
        }
    }
    Ok(())
}
