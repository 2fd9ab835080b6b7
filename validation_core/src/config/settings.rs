use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::validation::{FileExtensionsRule, UploadExtensionsValidator};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub fields: Vec<UploadFieldConfig>,
}

/// One validated upload field of the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadFieldConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl UploadFieldConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            extensions: None,
            error_message: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn build_validator(&self) -> UploadExtensionsValidator {
        let mut validator = UploadExtensionsValidator::new().for_property(self.name.clone());
        if let Some(extensions) = &self.extensions {
            validator.set_extensions(extensions.clone());
        }
        if let Some(message) = &self.error_message {
            validator.set_error_message(message.clone());
        }
        validator
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            uploads: UploadConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            fields: vec![UploadFieldConfig::new("file")],
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config.toml")
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.server.host.is_empty() {
            return Err(ConfigError::Message("Server host cannot be empty".to_string()));
        }

        if self.uploads.fields.is_empty() {
            return Err(ConfigError::Message(
                "At least one upload field must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for field in &self.uploads.fields {
            if field.name.trim().is_empty() {
                return Err(ConfigError::Message(
                    "Upload field name cannot be empty".to_string(),
                ));
            }

            if !seen.insert(field.name.as_str()) {
                return Err(ConfigError::Message(format!(
                    "Upload field '{}' is configured more than once",
                    field.name
                )));
            }

            if let Some(extensions) = &field.extensions {
                let rule = FileExtensionsRule::new(extensions.clone());
                if rule.extensions() != extensions.as_str() {
                    tracing::warn!(
                        "Upload field '{}' has no usable extensions, using default '{}'",
                        field.name,
                        rule.extensions()
                    );
                }
            }
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
