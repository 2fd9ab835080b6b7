//! Response bodies of the upload service

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::files::FormFileMetadata;
use crate::validation::ClientValidationRule;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Returned for a multipart form whose files all passed validation.
#[derive(Debug, Serialize)]
pub struct UploadReceipt {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    pub files: Vec<FormFileMetadata>,
}

impl UploadReceipt {
    pub fn new(files: Vec<FormFileMetadata>) -> Self {
        Self {
            id: Uuid::new_v4(),
            received_at: Utc::now(),
            files,
        }
    }
}

/// Client-side validation rules of one upload field.
#[derive(Debug, Serialize)]
pub struct FieldRules {
    pub name: String,
    pub display_name: String,
    pub rules: Vec<ClientValidationRule>,
}
