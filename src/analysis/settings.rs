use std::collections::{BTreeMap, BTreeSet};

use crate::analysis::names::NameTranslator;
use crate::api::ApiTypeName;
use crate::errors::{Result, TranslationError};
use crate::utils::PatternSet;

/// What to translate and how.
#[derive(Debug, Clone, Default)]
pub struct TranslationSettings {
    black_box_classes: PatternSet,
    controllers: PatternSet,
    endpoint_url_methods: PatternSet,
    imports: BTreeMap<String, Vec<String>>,
    imported_types: BTreeSet<ApiTypeName>,
    /// Prefix stripped from every endpoint URL before template parsing
    pub removed_url_prefix: String,
    /// Classes translated even when no endpoint refers to them
    pub roots: Vec<String>,
    pub name_translator: NameTranslator,
}

impl TranslationSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_black_box_pattern(&mut self, pattern: &str) -> Result<()> {
        self.black_box_classes.add_pattern(pattern)
    }

    pub fn add_controller_pattern(&mut self, pattern: &str) -> Result<()> {
        self.controllers.add_pattern(pattern)
    }

    /// Pattern over `ClassName.methodName` selecting endpoints that also get a URL-building method.
    pub fn add_endpoint_url_method_pattern(&mut self, pattern: &str) -> Result<()> {
        self.endpoint_url_methods.add_pattern(pattern)
    }

    /// Declares `types` as supplied by the external `module`.
    pub fn add_import(&mut self, module: &str, types: &[String]) -> Result<()> {
        if self.imports.contains_key(module) {
            return Err(TranslationError::DuplicateImport(module.to_string()));
        }
        self.imported_types.extend(types.iter().map(ApiTypeName::new));
        self.imports.insert(module.to_string(), types.to_vec());
        Ok(())
    }

    pub fn imports(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.imports.iter().map(|(m, t)| (m.as_str(), t.as_slice()))
    }

    pub fn is_imported(&self, name: &ApiTypeName) -> bool {
        self.imported_types.contains(name)
    }

    pub fn is_black_box_class(&self, qualified_name: &str) -> bool {
        self.black_box_classes.contains(qualified_name)
    }

    /// Every class is a candidate when no controller pattern is configured.
    pub fn is_processable_controller(&self, qualified_name: &str) -> bool {
        self.controllers.is_empty() || self.controllers.contains(qualified_name)
    }

    pub fn is_url_endpoint(&self, qualified_class_name: &str, method_name: &str) -> bool {
        self.endpoint_url_methods
            .contains(&format!("{}.{}", qualified_class_name, method_name))
    }

    pub fn normalize_url(&self, url: &str) -> String {
        if self.removed_url_prefix.is_empty() {
            return url.to_string();
        }
        url.strip_prefix(self.removed_url_prefix.as_str())
            .unwrap_or(url)
            .to_string()
    }
}
