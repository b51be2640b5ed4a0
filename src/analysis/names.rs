use std::collections::HashMap;

/// Maps qualified Java class names to the short names used in the API.
#[derive(Debug, Clone, Default)]
pub struct NameTranslator {
    overrides: HashMap<String, String>,
}

impl NameTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `display_name` for `qualified_name` instead of its simple name.
    pub fn register_class_name(&mut self, qualified_name: impl Into<String>, display_name: impl Into<String>) {
        self.overrides.insert(qualified_name.into(), display_name.into());
    }

    /// The configured override, else everything after the last `.` or `$`.
    pub fn translate_class_name(&self, qualified_name: &str) -> String {
        if let Some(name) = self.overrides.get(qualified_name) {
            return name.clone();
        }
        qualified_name
            .rsplit(['.', '$'])
            .next()
            .unwrap_or(qualified_name)
            .to_string()
    }

    /// Class name without a trailing `Controller`.
    pub fn translate_endpoint_group_name(&self, qualified_name: &str) -> String {
        let name = self.translate_class_name(qualified_name);
        match name.strip_suffix("Controller") {
            Some(stripped) if !stripped.is_empty() => stripped.to_string(),
            _ => name,
        }
    }
}
