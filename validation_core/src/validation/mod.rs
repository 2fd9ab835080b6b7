//! Upload validation: allow-list matching and the field-level validator built on it

pub mod extensions;
pub mod upload;

pub use extensions::*;
pub use upload::*;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use validator::ValidationError;

use crate::files::{FileLookup, UploadedFile};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: HashMap<String, Vec<String>>,
    pub field_errors: HashMap<String, FieldValidationError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldValidationError {
    pub field: String,
    pub value: Option<String>,
    pub errors: Vec<String>,
    pub error_codes: Vec<String>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            is_valid: true,
            errors: HashMap::new(),
            field_errors: HashMap::new(),
        }
    }

    /// Records a `validator` error, keeping its code and the rejected value when present.
    pub fn add_validation_error(&mut self, field: &str, error: &ValidationError) {
        self.is_valid = false;

        let message = error
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("Validation failed for field '{}'", field));
        let value = error
            .params
            .get("value")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        self.errors.entry(field.to_string())
            .or_insert_with(Vec::new)
            .push(message.clone());

        let entry = self.field_errors.entry(field.to_string())
            .or_insert_with(|| FieldValidationError {
                field: field.to_string(),
                value: None,
                errors: Vec::new(),
                error_codes: Vec::new(),
            });
        if entry.value.is_none() {
            entry.value = value;
        }
        entry.errors.push(message);
        entry.error_codes.push(error.code.to_string());
    }
}

/// The bound value of a model field, as seen by a validator.
#[derive(Clone, Copy)]
pub enum FieldValue<'a> {
    Missing,
    File(&'a dyn UploadedFile),
    Text(&'a str),
    Value(&'a serde_json::Value),
}

impl<'a> FieldValue<'a> {
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing | FieldValue::Value(serde_json::Value::Null))
    }

    pub fn describe(&self) -> Option<String> {
        match self {
            FieldValue::Missing => None,
            FieldValue::File(file) => Some(file.file_name().to_string()),
            FieldValue::Text(text) => Some(text.to_string()),
            FieldValue::Value(serde_json::Value::Null) => None,
            FieldValue::Value(serde_json::Value::String(s)) => Some(s.clone()),
            FieldValue::Value(other) => Some(other.to_string()),
        }
    }
}

impl std::fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Missing => write!(f, "Missing"),
            FieldValue::File(file) => f.debug_tuple("File").field(&file.file_name()).finish(),
            FieldValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            FieldValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(text: &'a str) -> Self {
        FieldValue::Text(text)
    }
}

impl<'a> From<&'a serde_json::Value> for FieldValue<'a> {
    fn from(value: &'a serde_json::Value) -> Self {
        FieldValue::Value(value)
    }
}

impl<'a, T: UploadedFile> From<Option<&'a T>> for FieldValue<'a> {
    fn from(file: Option<&'a T>) -> Self {
        match file {
            Some(file) => FieldValue::File(file),
            None => FieldValue::Missing,
        }
    }
}

/// Descriptor a browser-side script uses to mirror a server-side rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientValidationRule {
    pub validation_type: String,
    pub error_message: String,
    pub parameters: BTreeMap<String, String>,
}

impl ClientValidationRule {
    pub fn new(validation_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            validation_type: validation_type.into(),
            error_message: error_message.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

/// A validator attached to a single model field.
pub trait FieldValidator {
    fn is_valid(&self, value: FieldValue<'_>, files: Option<&dyn FileLookup>) -> bool;

    fn format_error_message(&self, field_name: &str) -> String;

    fn client_validation_rules(&self) -> Box<dyn Iterator<Item = ClientValidationRule> + '_>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_errors_accumulate_per_field() {
        let mut result = ValidationResult::success();
        result.add_validation_error("avatar", &ValidationError::new("accept"));
        result.add_validation_error("avatar", &ValidationError::new("accept"));

        assert!(!result.is_valid);
        assert_eq!(result.errors["avatar"].len(), 2);
        assert_eq!(result.errors["avatar"][0], "Validation failed for field 'avatar'");
        assert_eq!(result.field_errors["avatar"].error_codes.len(), 2);
    }

    #[test]
    fn test_add_validation_error_keeps_code_and_value() {
        let mut error = ValidationError::new("accept");
        error.message = Some("The avatar field is wrong".into());
        error.add_param("value".into(), &"photo.bmp");

        let mut result = ValidationResult::success();
        result.add_validation_error("avatar", &error);

        let field_error = &result.field_errors["avatar"];
        assert_eq!(field_error.error_codes, vec!["accept".to_string()]);
        assert_eq!(field_error.value.as_deref(), Some("photo.bmp"));
        assert_eq!(result.errors["avatar"], vec!["The avatar field is wrong".to_string()]);
    }

    #[test]
    fn test_null_value_is_missing() {
        let null = json!(null);
        assert!(FieldValue::from(&null).is_missing());
        assert!(FieldValue::Missing.is_missing());
        assert!(!FieldValue::Text("a.png").is_missing());
    }

    #[test]
    fn test_client_rule_serializes_camel_case() {
        let rule = ClientValidationRule::new("accept", "msg").with_parameter("exts", "png");
        let value = serde_json::to_value(&rule).unwrap();

        assert_eq!(value["validationType"], "accept");
        assert_eq!(value["errorMessage"], "msg");
        assert_eq!(value["parameters"]["exts"], "png");
    }
}
