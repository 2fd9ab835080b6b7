use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::{info, warn};

use crate::{
    config::UploadFieldConfig,
    error::{AppError, Result},
    files::{read_multipart, BoundForm, FileLookup},
    models::{ApiResponse, FieldRules, UploadReceipt},
    validation::{FieldValue, UploadExtensionsValidator, ValidationResult},
    AppState,
};

/// A configured form field together with its extension validator.
#[derive(Debug, Clone)]
pub struct UploadField {
    pub name: String,
    pub display_name: String,
    pub validator: UploadExtensionsValidator,
}

impl From<&UploadFieldConfig> for UploadField {
    fn from(config: &UploadFieldConfig) -> Self {
        Self {
            name: config.name.clone(),
            display_name: config.display_name().to_string(),
            validator: config.build_validator(),
        }
    }
}

impl UploadField {
    pub fn rules(&self) -> FieldRules {
        FieldRules {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            rules: self.validator.client_validation_rules().collect(),
        }
    }
}

/// The value model binding produces for `field`: the uploaded file when one
/// was sent, otherwise the plain text part of the same name.
pub fn bind_value<'a>(form: &'a BoundForm, field: &str) -> FieldValue<'a> {
    if let Some(file) = form.files.get(field) {
        return FieldValue::File(file);
    }
    match form.text(field) {
        Some(text) => FieldValue::Text(text),
        None => FieldValue::Missing,
    }
}

pub fn validate_form(fields: &[UploadField], form: &BoundForm) -> ValidationResult {
    let files: &dyn FileLookup = &form.files;
    let mut result = ValidationResult::success();

    for field in fields {
        let value = bind_value(form, &field.name);
        if let Err(error) = field.validator.validate(&field.display_name, value, Some(files)) {
            result.add_validation_error(&field.name, &error);
        }
    }

    result
}

pub async fn upload_files(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<UploadReceipt>>> {
    let form = read_multipart(multipart).await?;

    let result = validate_form(&state.upload_fields, &form);
    if !result.is_valid {
        warn!(
            fields = ?result.errors.keys().collect::<Vec<_>>(),
            "Upload rejected by extension validation"
        );
        return Err(AppError::Validation(result));
    }

    let files: Vec<_> = form.files.iter().map(|file| file.metadata()).collect();
    info!(file_count = files.len(), "Upload accepted");

    Ok(Json(
        ApiResponse::success(UploadReceipt::new(files)).with_message("Upload accepted"),
    ))
}

pub async fn list_rules(State(state): State<AppState>) -> Json<ApiResponse<Vec<FieldRules>>> {
    let rules: Vec<FieldRules> = state.upload_fields.iter().map(UploadField::rules).collect();
    Json(ApiResponse::success(rules))
}
