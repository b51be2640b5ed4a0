//! API model
//!
//! The translated, target-agnostic description of an API: class, enum and
//! discriminated union definitions, endpoint groups, black boxes and imports.
//! Code generators consume it read-only, typically after serializing it to JSON.

pub mod types;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use serde::Serialize;

use crate::errors::{Result, TranslationError};

pub use types::{ApiType, ApiTypeName, PrimitiveType};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ApiType,
}

impl PropertyDefinition {
    pub fn new(name: impl Into<String>, ty: ApiType) -> Self {
        Self { name: name.into(), ty }
    }
}

/// Properties of a class, iterated in name order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDefinition {
    pub name: ApiTypeName,
    properties: BTreeMap<String, PropertyDefinition>,
}

impl ClassDefinition {
    pub fn new(name: ApiTypeName) -> Self {
        Self {
            name,
            properties: BTreeMap::new(),
        }
    }

    pub fn add_property(&mut self, property: PropertyDefinition) -> Result<()> {
        if self.properties.contains_key(&property.name) {
            return Err(TranslationError::DuplicateProperty {
                class: self.name.to_string(),
                property: property.name,
            });
        }
        self.properties.insert(property.name.clone(), property);
        Ok(())
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyDefinition> {
        self.properties.values()
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDefinition {
    pub name: ApiTypeName,
    /// Declaration order
    pub constants: Vec<String>,
}

impl EnumDefinition {
    pub fn new(name: ApiTypeName, constants: Vec<String>) -> Self {
        Self { name, constants }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscriminatedUnionDefinition {
    pub name: ApiTypeName,
    /// Name of the tag property
    pub discriminator: String,
    types: BTreeMap<String, ClassDefinition>,
}

impl DiscriminatedUnionDefinition {
    pub fn new(name: ApiTypeName, discriminator: impl Into<String>) -> Self {
        Self {
            name,
            discriminator: discriminator.into(),
            types: BTreeMap::new(),
        }
    }

    pub fn add_type(&mut self, discriminator_value: impl Into<String>, definition: ClassDefinition) -> Result<()> {
        let value = discriminator_value.into();
        if self.types.contains_key(&value) {
            return Err(TranslationError::DuplicateUnionCase {
                union: self.name.to_string(),
                case: value,
            });
        }
        self.types.insert(value, definition);
        Ok(())
    }

    pub fn types(&self) -> &BTreeMap<String, ClassDefinition> {
        &self.types
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportDefinition {
    pub module: String,
    pub types: BTreeSet<ApiTypeName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "OPTIONS" => Ok(HttpMethod::Options),
            "TRACE" => Ok(HttpMethod::Trace),
            other => Err(format!("unknown HTTP method: {}", other)),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        };
        write!(f, "{}", name)
    }
}

/// URI template with plain `{variable}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UriTemplate(String);

impl UriTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EndpointParameter {
    RequestBody {
        name: String,
        #[serde(rename = "type")]
        ty: ApiType,
    },
    RequestParam {
        name: String,
        /// Name in the query string
        query_parameter: String,
        #[serde(rename = "type")]
        ty: ApiType,
    },
    PathVariable {
        name: String,
        /// Name of the `{variable}` in the URI template
        path_variable: String,
        #[serde(rename = "type")]
        ty: ApiType,
    },
}

impl EndpointParameter {
    pub fn name(&self) -> &str {
        match self {
            EndpointParameter::RequestBody { name, .. }
            | EndpointParameter::RequestParam { name, .. }
            | EndpointParameter::PathVariable { name, .. } => name,
        }
    }

    pub fn ty(&self) -> &ApiType {
        match self {
            EndpointParameter::RequestBody { ty, .. }
            | EndpointParameter::RequestParam { ty, .. }
            | EndpointParameter::PathVariable { ty, .. } => ty,
        }
    }
}

impl fmt::Display for EndpointParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointParameter::RequestBody { name, ty } => write!(f, "@RequestBody {} {}", ty, name),
            EndpointParameter::RequestParam { name, query_parameter, ty } => {
                write!(f, "@RequestParam")?;
                if query_parameter != name {
                    write!(f, "(\"{}\")", query_parameter)?;
                }
                write!(f, " {} {}", ty, name)
            }
            EndpointParameter::PathVariable { name, path_variable, ty } => {
                write!(f, "@PathVariable")?;
                if path_variable != name {
                    write!(f, "(\"{}\")", path_variable)?;
                }
                write!(f, " {} {}", ty, name)
            }
        }
    }
}

/// A single operation reachable at a URI, e.g. one controller method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endpoint {
    pub name: String,
    pub uri_template: UriTemplate,
    pub method: HttpMethod,
    pub response_body: Option<ApiType>,
    pub parameters: Vec<EndpointParameter>,
    /// Generators should also emit a method returning the URL
    pub generate_url_method: bool,
}

impl Endpoint {
    pub fn request_body(&self) -> Option<&EndpointParameter> {
        self.parameters
            .iter()
            .find(|p| matches!(p, EndpointParameter::RequestBody { .. }))
    }

    pub fn path_variables(&self) -> impl Iterator<Item = &EndpointParameter> {
        self.parameters
            .iter()
            .filter(|p| matches!(p, EndpointParameter::PathVariable { .. }))
    }

    pub fn request_parameters(&self) -> impl Iterator<Item = &EndpointParameter> {
        self.parameters
            .iter()
            .filter(|p| matches!(p, EndpointParameter::RequestParam { .. }))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.response_body {
            Some(body) => write!(f, "{} ", body)?,
            None => write!(f, "void ")?,
        }
        write!(f, "{}(", self.name)?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, "): {} {}", self.method, self.uri_template)
    }
}

/// Related endpoints, keyed by name. The first endpoint of a name wins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointGroup {
    pub name: String,
    endpoints: BTreeMap<String, Endpoint>,
}

impl EndpointGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoints: BTreeMap::new(),
        }
    }

    /// Returns false when an endpoint of the same name already exists.
    pub fn add_endpoint(&mut self, endpoint: Endpoint) -> bool {
        if self.endpoints.contains_key(&endpoint.name) {
            return false;
        }
        self.endpoints.insert(endpoint.name.clone(), endpoint);
        true
    }

    pub fn endpoint(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.get(name)
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.values()
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }
}

/// The whole translated API.
///
/// A type name is defined at most once across classes, enums and unions.
/// Definitions are registered before they are populated so that recursive
/// references find them: first `add_*` with an empty placeholder, then
/// `complete_*` with the populated definition.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApiDefinition {
    endpoint_groups: Vec<EndpointGroup>,
    class_definitions: BTreeMap<ApiTypeName, ClassDefinition>,
    enum_definitions: BTreeMap<ApiTypeName, EnumDefinition>,
    discriminated_unions: BTreeMap<ApiTypeName, DiscriminatedUnionDefinition>,
    black_boxes: BTreeSet<ApiTypeName>,
    type_aliases: BTreeMap<ApiTypeName, ApiType>,
    imports: BTreeMap<String, ImportDefinition>,
}

impl ApiDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_type(&self, name: &ApiTypeName) -> bool {
        self.class_definitions.contains_key(name)
            || self.enum_definitions.contains_key(name)
            || self.discriminated_unions.contains_key(name)
    }

    fn verify_type_does_not_exist(&self, name: &ApiTypeName) -> Result<()> {
        if self.contains_type(name) {
            return Err(TranslationError::DuplicateDefinition(name.to_string()));
        }
        Ok(())
    }

    pub fn add_class_definition(&mut self, definition: ClassDefinition) -> Result<()> {
        self.verify_type_does_not_exist(&definition.name)?;
        self.class_definitions.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Replaces the placeholder registered under the same name.
    pub fn complete_class_definition(&mut self, definition: ClassDefinition) -> Result<()> {
        match self.class_definitions.get_mut(&definition.name) {
            Some(slot) => {
                *slot = definition;
                Ok(())
            }
            None => Err(TranslationError::MissingPlaceholder(definition.name.to_string())),
        }
    }

    pub fn add_enum_definition(&mut self, definition: EnumDefinition) -> Result<()> {
        self.verify_type_does_not_exist(&definition.name)?;
        self.enum_definitions.insert(definition.name.clone(), definition);
        Ok(())
    }

    pub fn add_discriminated_union(&mut self, definition: DiscriminatedUnionDefinition) -> Result<()> {
        self.verify_type_does_not_exist(&definition.name)?;
        self.discriminated_unions.insert(definition.name.clone(), definition);
        Ok(())
    }

    pub fn complete_discriminated_union(&mut self, definition: DiscriminatedUnionDefinition) -> Result<()> {
        match self.discriminated_unions.get_mut(&definition.name) {
            Some(slot) => {
                *slot = definition;
                Ok(())
            }
            None => Err(TranslationError::MissingPlaceholder(definition.name.to_string())),
        }
    }

    pub fn add_black_box(&mut self, name: ApiTypeName) {
        self.black_boxes.insert(name);
    }

    pub fn add_type_alias(&mut self, name: ApiTypeName, target: ApiType) {
        self.type_aliases.entry(name).or_insert(target);
    }

    pub fn add_endpoint_group(&mut self, group: EndpointGroup) {
        self.endpoint_groups.push(group);
    }

    /// Registers display names supplied by an external module.
    pub fn add_import(&mut self, module: &str, types: &[String]) -> Result<()> {
        for ty in types {
            let name = ApiTypeName::new(ty.as_str());
            if self.imports.values().any(|i| i.types.contains(&name)) {
                return Err(TranslationError::DuplicateImport(ty.clone()));
            }
            self.imports
                .entry(module.to_string())
                .or_insert_with(|| ImportDefinition {
                    module: module.to_string(),
                    types: BTreeSet::new(),
                })
                .types
                .insert(name);
        }
        Ok(())
    }

    pub fn class_definition(&self, name: &str) -> Option<&ClassDefinition> {
        self.class_definitions.get(&ApiTypeName::new(name))
    }

    pub fn enum_definition(&self, name: &str) -> Option<&EnumDefinition> {
        self.enum_definitions.get(&ApiTypeName::new(name))
    }

    pub fn discriminated_union(&self, name: &str) -> Option<&DiscriminatedUnionDefinition> {
        self.discriminated_unions.get(&ApiTypeName::new(name))
    }

    pub fn type_alias(&self, name: &str) -> Option<&ApiType> {
        self.type_aliases.get(&ApiTypeName::new(name))
    }

    pub fn class_definitions(&self) -> impl Iterator<Item = &ClassDefinition> {
        self.class_definitions.values()
    }

    pub fn enum_definitions(&self) -> impl Iterator<Item = &EnumDefinition> {
        self.enum_definitions.values()
    }

    pub fn discriminated_unions(&self) -> impl Iterator<Item = &DiscriminatedUnionDefinition> {
        self.discriminated_unions.values()
    }

    pub fn type_aliases(&self) -> &BTreeMap<ApiTypeName, ApiType> {
        &self.type_aliases
    }

    pub fn imports(&self) -> impl Iterator<Item = &ImportDefinition> {
        self.imports.values()
    }

    pub fn black_boxes(&self) -> &BTreeSet<ApiTypeName> {
        &self.black_boxes
    }

    /// Endpoint groups in name order.
    pub fn endpoint_groups(&self) -> Vec<&EndpointGroup> {
        let mut groups: Vec<_> = self.endpoint_groups.iter().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        groups
    }

    pub fn endpoint_group(&self, name: &str) -> Option<&EndpointGroup> {
        self.endpoint_groups.iter().find(|g| g.name == name)
    }

    pub fn endpoint_group_count(&self) -> usize {
        self.endpoint_groups.len()
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoint_groups.iter().map(EndpointGroup::endpoint_count).sum()
    }

    pub fn class_definition_count(&self) -> usize {
        self.class_definitions.len()
    }

    pub fn enum_definition_count(&self) -> usize {
        self.enum_definitions.len()
    }

    pub fn discriminated_union_count(&self) -> usize {
        self.discriminated_unions.len()
    }

    /// Class references that have no definition, black box or alias behind them.
    ///
    /// These come from classes that were referenced but not loaded.
    pub fn unknown_type_references(&self) -> BTreeSet<ApiTypeName> {
        let mut referenced = BTreeSet::new();

        for endpoint in self.endpoint_groups.iter().flat_map(EndpointGroup::endpoints) {
            if let Some(body) = &endpoint.response_body {
                body.collect_class_references(&mut referenced);
            }
            for parameter in &endpoint.parameters {
                parameter.ty().collect_class_references(&mut referenced);
            }
        }

        let union_members = self.discriminated_unions.values().flat_map(|u| u.types.values());
        for class in self.class_definitions.values().chain(union_members) {
            for property in class.properties() {
                property.ty.collect_class_references(&mut referenced);
            }
        }

        for target in self.type_aliases.values() {
            target.collect_class_references(&mut referenced);
        }

        referenced
            .into_iter()
            .filter(|name| {
                !self.contains_type(name) && !self.black_boxes.contains(name) && !self.type_aliases.contains_key(name)
            })
            .collect()
    }

    /// Explicit black boxes together with unknown references, which are treated as black boxes too.
    pub fn all_black_box_classes(&self) -> BTreeSet<ApiTypeName> {
        let mut all = self.black_boxes.clone();
        all.extend(self.unknown_type_references());
        all
    }
}
