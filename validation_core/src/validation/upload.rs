//! Extension validator for uploaded-file model fields

use std::borrow::Cow;
use tracing::debug;
use validator::ValidationError;

use super::{ClientValidationRule, FieldValidator, FieldValue, FileExtensionsRule, ValidationResult};
use crate::files::FileLookup;

pub const ACCEPT_VALIDATION_TYPE: &str = "accept";

/// Checks that the file bound to a field has an accepted extension.
///
/// The file name comes either from the bound value itself or, when binding
/// produced something else, from the request's files under `property_name`.
#[derive(Debug, Clone, Default)]
pub struct UploadExtensionsValidator {
    inner: FileExtensionsRule,
    property_name: Option<String>,
}

impl UploadExtensionsValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extensions(mut self, extensions: impl Into<String>) -> Self {
        self.set_extensions(extensions);
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.set_error_message(message);
        self
    }

    pub fn for_property(mut self, property_name: impl Into<String>) -> Self {
        self.set_property_name(property_name);
        self
    }

    pub fn extensions(&self) -> &str {
        self.inner.extensions()
    }

    pub fn set_extensions(&mut self, extensions: impl Into<String>) {
        self.inner.set_extensions(extensions);
    }

    pub fn error_message(&self) -> &str {
        self.inner.error_message()
    }

    pub fn set_error_message(&mut self, message: impl Into<String>) {
        self.inner.set_error_message(message);
    }

    pub fn property_name(&self) -> Option<&str> {
        self.property_name.as_deref()
    }

    pub fn set_property_name(&mut self, property_name: impl Into<String>) {
        self.property_name = Some(property_name.into());
    }

    pub fn is_valid(&self, value: FieldValue<'_>, files: Option<&dyn FileLookup>) -> bool {
        if value.is_missing() {
            return true;
        }

        if let FieldValue::File(file) = value {
            return self.inner.is_valid_file_name(file.file_name());
        }

        if let Some(files) = files.filter(|files| files.file_count() > 0) {
            let bound = self
                .property_name
                .as_deref()
                .and_then(|property| files.get_file(property));
            if let Some(file) = bound {
                debug!(
                    property = ?self.property_name,
                    file_name = file.file_name(),
                    "Validating file from request files"
                );
                return self.inner.is_valid_file_name(file.file_name());
            }
        }

        debug!(?value, "No uploaded file bound, validating raw value");
        self.inner.is_valid(&value)
    }

    pub fn format_error_message(&self, field_name: &str) -> String {
        self.inner.format_error_message(field_name)
    }

    pub fn client_validation_rules(&self) -> impl Iterator<Item = ClientValidationRule> + '_ {
        std::iter::once_with(move || {
            ClientValidationRule::new(ACCEPT_VALIDATION_TYPE, self.error_message())
                .with_parameter("exts", self.extensions())
        })
    }

    /// Same decision as [`is_valid`](Self::is_valid), reported as a `validator` error.
    pub fn validate(
        &self,
        field: &str,
        value: FieldValue<'_>,
        files: Option<&dyn FileLookup>,
    ) -> Result<(), ValidationError> {
        if self.is_valid(value, files) {
            return Ok(());
        }

        let mut error = ValidationError::new(ACCEPT_VALIDATION_TYPE);
        error.message = Some(Cow::Owned(self.format_error_message(field)));
        error.add_param(Cow::Borrowed("field"), &field);
        error.add_param(Cow::Borrowed("exts"), &self.extensions());
        if let Some(rejected) = self.rejected_file_name(value, files) {
            error.add_param(Cow::Borrowed("value"), &rejected);
        }
        Err(error)
    }

    pub fn validate_field(
        &self,
        field: &str,
        value: FieldValue<'_>,
        files: Option<&dyn FileLookup>,
    ) -> ValidationResult {
        let mut result = ValidationResult::success();
        if let Err(error) = self.validate(field, value, files) {
            result.add_validation_error(field, &error);
        }
        result
    }

    fn rejected_file_name(&self, value: FieldValue<'_>, files: Option<&dyn FileLookup>) -> Option<String> {
        if let FieldValue::File(file) = value {
            return Some(file.file_name().to_string());
        }
        files
            .zip(self.property_name.as_deref())
            .and_then(|(files, property)| files.get_file(property))
            .map(|file| file.file_name().to_string())
            .or_else(|| value.describe())
    }
}

impl FieldValidator for UploadExtensionsValidator {
    fn is_valid(&self, value: FieldValue<'_>, files: Option<&dyn FileLookup>) -> bool {
        UploadExtensionsValidator::is_valid(self, value, files)
    }

    fn format_error_message(&self, field_name: &str) -> String {
        UploadExtensionsValidator::format_error_message(self, field_name)
    }

    fn client_validation_rules(&self) -> Box<dyn Iterator<Item = ClientValidationRule> + '_> {
        Box::new(UploadExtensionsValidator::client_validation_rules(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::{FormFile, RequestFiles};
    use serde_json::json;

    fn files_with(field: &str, file_name: &str) -> RequestFiles {
        vec![FormFile::new(field, file_name)].into_iter().collect()
    }

    #[test]
    fn test_missing_value_is_valid() {
        let validator = UploadExtensionsValidator::new().with_extensions("pdf");
        assert!(validator.is_valid(FieldValue::Missing, None));

        let null = json!(null);
        assert!(validator.is_valid(FieldValue::Value(&null), None));
    }

    #[test]
    fn test_uploaded_file_case_insensitive() {
        let validator = UploadExtensionsValidator::new().with_extensions("png,jpg");
        let photo = FormFile::new("photo", "photo.JPG");
        let document = FormFile::new("photo", "document.pdf");

        assert!(validator.is_valid(FieldValue::File(&photo), None));
        assert!(!validator.is_valid(FieldValue::File(&document), None));
    }

    #[test]
    fn test_default_matches_explicit_list() {
        let default = UploadExtensionsValidator::new();
        let explicit = UploadExtensionsValidator::new().with_extensions("png,jpg,jpeg,gif");

        for name in ["a.png", "b.JPEG", "c.gif", "d.jpg", "e.bmp", "f", "g.pdf"] {
            let file = FormFile::new("f", name);
            assert_eq!(
                default.is_valid(FieldValue::File(&file), None),
                explicit.is_valid(FieldValue::File(&file), None),
                "mismatch for {}",
                name
            );
        }
    }

    #[test]
    fn test_raw_value_without_files() {
        let validator = UploadExtensionsValidator::new().with_extensions("png,jpg");
        assert!(!validator.is_valid(FieldValue::Text("notafile"), None));

        let number = json!(7);
        assert!(!validator.is_valid(FieldValue::Value(&number), None));
    }

    #[test]
    fn test_looks_up_bound_property_in_request_files() {
        let validator = UploadExtensionsValidator::new()
            .with_extensions("pdf")
            .for_property("resume");

        let accepted = files_with("resume", "cv.PDF");
        assert!(validator.is_valid(FieldValue::Text("notafile"), Some(&accepted)));

        let rejected = files_with("resume", "cv.docx");
        assert!(!validator.is_valid(FieldValue::Text("cv.pdf"), Some(&rejected)));
    }

    #[test]
    fn test_falls_back_when_property_not_in_files() {
        let validator = UploadExtensionsValidator::new()
            .with_extensions("pdf")
            .for_property("resume");

        let files = files_with("avatar", "me.png");
        assert!(validator.is_valid(FieldValue::Text("cv.pdf"), Some(&files)));
        assert!(!validator.is_valid(FieldValue::Text("notafile"), Some(&files)));

        let empty = RequestFiles::new();
        assert!(validator.is_valid(FieldValue::Text("cv.pdf"), Some(&empty)));
    }

    #[test]
    fn test_uploaded_file_takes_precedence_over_request_files() {
        let validator = UploadExtensionsValidator::new()
            .with_extensions("png")
            .for_property("avatar");
        let files = files_with("avatar", "other.exe");
        let bound = FormFile::new("avatar", "me.png");

        assert!(validator.is_valid(FieldValue::File(&bound), Some(&files)));
    }

    #[test]
    fn test_format_error_message_delegates() {
        let validator = UploadExtensionsValidator::new();
        let message = validator.format_error_message("Avatar");

        assert!(message.contains("Avatar"));
        assert_eq!(message, FileExtensionsRule::default().format_error_message("Avatar"));
    }

    #[test]
    fn test_custom_error_message() {
        let validator = UploadExtensionsValidator::new()
            .with_extensions("pdf")
            .with_error_message("{0}: only {1} please");

        assert_eq!(validator.error_message(), "{0}: only {1} please");
        assert_eq!(validator.format_error_message("Resume"), "Resume: only .pdf please");
    }

    #[test]
    fn test_client_validation_rules() {
        let validator = UploadExtensionsValidator::new().with_extensions(".PNG, jpg");
        let rules: Vec<_> = validator.client_validation_rules().collect();

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].validation_type, "accept");
        assert_eq!(rules[0].error_message, validator.error_message());
        assert_eq!(rules[0].parameters.get("exts").map(String::as_str), Some(".PNG, jpg"));
    }

    #[test]
    fn test_validate_reports_validator_error() {
        let validator = UploadExtensionsValidator::new().with_extensions("png");
        let file = FormFile::new("avatar", "me.gif");

        let error = validator
            .validate("Avatar", FieldValue::File(&file), None)
            .unwrap_err();
        assert_eq!(error.code, "accept");
        assert_eq!(error.params["value"], json!("me.gif"));
        assert_eq!(error.params["exts"], json!("png"));
        assert_eq!(
            error.message.as_deref(),
            Some("The Avatar field only accepts files with the following extensions: .png")
        );
    }

    #[test]
    fn test_validate_field_collects_result() {
        let validator = UploadExtensionsValidator::new()
            .with_extensions("png")
            .for_property("avatar");
        let files = files_with("avatar", "me.bmp");

        let result = validator.validate_field("avatar", FieldValue::Text(""), Some(&files));
        assert!(!result.is_valid);
        assert_eq!(result.field_errors["avatar"].value.as_deref(), Some("me.bmp"));
        assert_eq!(result.field_errors["avatar"].error_codes, vec!["accept".to_string()]);

        let ok = validator.validate_field("avatar", FieldValue::Missing, Some(&files));
        assert!(ok.is_valid);
    }

    #[test]
    fn test_usable_through_trait_object() {
        let validator: Box<dyn FieldValidator> =
            Box::new(UploadExtensionsValidator::new().with_extensions("txt"));
        let file = FormFile::new("notes", "notes.TXT");

        assert!(validator.is_valid(FieldValue::File(&file), None));
        assert_eq!(validator.client_validation_rules().count(), 1);
    }
}
