use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, Level};

use crate::analysis::TranslationSettings;
use crate::errors::Result;
use crate::infrastructure::logging::{LogConfig, LogFormat, LogOutput};

pub const CONFIG_FILE_NAME: &str = "apinfer.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Qualified class name to display name
    #[serde(default)]
    pub names: BTreeMap<String, String>,

    #[serde(default)]
    pub imports: Vec<ImportConfig>,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Regular expressions over qualified class names
    #[serde(default)]
    pub black_box: Vec<String>,

    #[serde(default)]
    pub controllers: Vec<String>,

    /// Regular expressions over `ClassName.methodName`
    #[serde(default)]
    pub endpoint_url_methods: Vec<String>,

    #[serde(default)]
    pub removed_url_prefix: String,

    #[serde(default)]
    pub roots: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    pub module: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Representation choices passed through to code generators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub optional_type_mode: OptionalTypeMode,

    #[serde(default)]
    pub enum_mode: EnumMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionalTypeMode {
    #[default]
    Null,
    Undefined,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumMode {
    #[default]
    Default,
    IntEnum,
    StringUnion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// Write to daily rolling files in this directory instead of stderr
    #[serde(default)]
    pub directory: Option<PathBuf>,

    #[serde(default)]
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            directory: None,
            filter: None,
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

impl LoggingConfig {
    /// Unknown level names fall back to `warn`.
    pub fn to_log_config(&self) -> LogConfig {
        let level = self.level.parse::<Level>().unwrap_or(Level::WARN);
        let output = match &self.directory {
            Some(directory) => LogOutput::File {
                directory: directory.to_string_lossy().to_string(),
                prefix: "apinfer".to_string(),
            },
            None => LogOutput::Stderr,
        };

        let config = LogConfig::new()
            .with_level(level)
            .with_format(self.format)
            .with_output(output);
        match &self.filter {
            Some(filter) => config.with_filter(filter.clone()),
            None => config,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Finds `apinfer.toml` in `start` or its nearest ancestor that has one.
    pub fn discover(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Builds translation settings, compiling every pattern.
    pub fn to_settings(&self) -> Result<TranslationSettings> {
        let mut settings = TranslationSettings::new();
        let translation = &self.translation;

        for pattern in &translation.black_box {
            settings.add_black_box_pattern(pattern)?;
        }
        for pattern in &translation.controllers {
            settings.add_controller_pattern(pattern)?;
        }
        for pattern in &translation.endpoint_url_methods {
            settings.add_endpoint_url_method_pattern(pattern)?;
        }
        settings.removed_url_prefix = translation.removed_url_prefix.clone();
        settings.roots = translation.roots.clone();

        for (qualified_name, display_name) in &self.names {
            settings
                .name_translator
                .register_class_name(qualified_name.as_str(), display_name.as_str());
        }
        for import in &self.imports {
            settings.add_import(&import.module, &import.types)?;
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiTypeName;
    use crate::errors::TranslationError;

    const SAMPLE: &str = r#"
[translation]
black_box = ['java\.time\..*']
controllers = ['com\.example\.api\..*']
endpoint_url_methods = ['.*\.download.*']
removed_url_prefix = "/api"
roots = ["com.example.Event"]

[names]
"com.example.legacy.Order" = "LegacyOrder"

[[imports]]
module = "@shared/money"
types = ["Money"]

[output]
optional_type_mode = "undefined"
enum_mode = "string_union"

[logging]
level = "debug"
format = "json"
"#;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.translation.black_box.is_empty());
        assert_eq!(config.output.optional_type_mode, OptionalTypeMode::Null);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_parse_config() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.translation.removed_url_prefix, "/api");
        assert_eq!(config.names["com.example.legacy.Order"], "LegacyOrder");
        assert_eq!(config.imports[0].module, "@shared/money");
        assert_eq!(config.output.enum_mode, EnumMode::StringUnion);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_settings_from_config() {
        let settings = Config::parse(SAMPLE).unwrap().to_settings().unwrap();

        assert!(settings.is_black_box_class("java.time.Instant"));
        assert!(settings.is_processable_controller("com.example.api.OrderController"));
        assert!(!settings.is_processable_controller("com.example.OrderController"));
        assert!(settings.is_url_endpoint("com.example.api.FileController", "downloadFile"));
        assert!(settings.is_imported(&ApiTypeName::new("Money")));
        assert_eq!(settings.normalize_url("/api/orders"), "/orders");
        assert_eq!(settings.roots, vec!["com.example.Event".to_string()]);
        assert_eq!(
            settings.name_translator.translate_class_name("com.example.legacy.Order"),
            "LegacyOrder"
        );
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(Config::parse("[translation\n"), Err(TranslationError::Config(_))));

        let config = Config::parse("[translation]\nblack_box = ['(']\n").unwrap();
        assert!(matches!(config.to_settings(), Err(TranslationError::InvalidPattern { .. })));
    }

    #[test]
    fn test_save_load_and_discover() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("service").join("module");
        fs::create_dir_all(&nested).unwrap();

        let path = dir.path().join(CONFIG_FILE_NAME);
        let config = Config::parse(SAMPLE).unwrap();
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
        assert_eq!(Config::discover(&nested), Some(path));
    }
}
