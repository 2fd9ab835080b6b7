//! Reads multipart form bodies into the per-request file collection

use axum::extract::Multipart;
use std::collections::HashMap;
use tracing::debug;

use super::models::{FormFile, RequestFiles};
use crate::error::{AppError, Result};

/// A multipart form split into its file parts and its plain text parts.
#[derive(Debug, Clone, Default)]
pub struct BoundForm {
    pub files: RequestFiles,
    pub fields: HashMap<String, String>,
}

impl BoundForm {
    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

pub async fn read_multipart(mut multipart: Multipart) -> Result<BoundForm> {
    let mut form = BoundForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let name = match field.name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                debug!("Skipping unnamed multipart field");
                continue;
            }
        };

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                // An empty file input still posts a part with no name and no content.
                if file_name.trim().is_empty() && data.is_empty() {
                    debug!(field = %name, "Skipping empty file input");
                    continue;
                }

                debug!(field = %name, file_name = %file_name, size = data.len(), "Received file part");

                let mut file = FormFile::new(name, file_name).with_data(data);
                file.content_type = content_type;
                form.files.insert(file);
            }
            None => {
                let value = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read form field '{}': {}", name, e))
                })?;
                form.fields.entry(name).or_insert(value);
            }
        }
    }

    Ok(form)
}
