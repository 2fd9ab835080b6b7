use axum::body::Bytes;
use serde::Serialize;
use std::collections::HashMap;

/// A file received as part of a request. Validators only ever need its name.
pub trait UploadedFile {
    fn file_name(&self) -> &str;
}

/// Per-request lookup from form field name to uploaded file.
pub trait FileLookup {
    fn file_count(&self) -> usize;

    fn get_file(&self, field: &str) -> Option<&dyn UploadedFile>;
}

#[derive(Debug, Clone)]
pub struct FormFile {
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl FormFile {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            content_type: None,
            data: Bytes::new(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn metadata(&self) -> FormFileMetadata {
        FormFileMetadata {
            field: self.field.clone(),
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            size: self.size(),
        }
    }
}

impl UploadedFile for FormFile {
    fn file_name(&self) -> &str {
        &self.file_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormFileMetadata {
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: u64,
}

/// Files of a single request, keyed by form field name.
#[derive(Debug, Clone, Default)]
pub struct RequestFiles {
    files: HashMap<String, FormFile>,
}

impl RequestFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file under its field name. When a field carries several files the
    /// first one stays addressable by name, so later ones are ignored.
    pub fn insert(&mut self, file: FormFile) -> bool {
        if self.files.contains_key(&file.field) {
            tracing::debug!("Ignoring additional file for field '{}'", file.field);
            return false;
        }
        self.files.insert(file.field.clone(), file);
        true
    }

    pub fn get(&self, field: &str) -> Option<&FormFile> {
        self.files.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormFile> {
        self.files.values()
    }
}

impl FromIterator<FormFile> for RequestFiles {
    fn from_iter<I: IntoIterator<Item = FormFile>>(iter: I) -> Self {
        let mut files = RequestFiles::new();
        for file in iter {
            files.insert(file);
        }
        files
    }
}

impl FileLookup for RequestFiles {
    fn file_count(&self) -> usize {
        self.files.len()
    }

    fn get_file(&self, field: &str) -> Option<&dyn UploadedFile> {
        self.files.get(field).map(|file| file as &dyn UploadedFile)
    }
}

impl<T: UploadedFile> FileLookup for HashMap<String, T> {
    fn file_count(&self) -> usize {
        self.len()
    }

    fn get_file(&self, field: &str) -> Option<&dyn UploadedFile> {
        self.get(field).map(|file| file as &dyn UploadedFile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_file_per_field_wins() {
        let mut files = RequestFiles::new();
        assert!(files.insert(FormFile::new("avatar", "first.png")));
        assert!(!files.insert(FormFile::new("avatar", "second.gif")));

        assert_eq!(files.file_count(), 1);
        assert_eq!(files.get_file("avatar").map(|f| f.file_name()), Some("first.png"));
    }

    #[test]
    fn test_lookup_missing_field() {
        let files: RequestFiles = vec![FormFile::new("avatar", "me.png")].into_iter().collect();

        assert_eq!(files.file_count(), 1);
        assert!(files.get_file("document").is_none());
    }

    #[test]
    fn test_hash_map_lookup() {
        let mut map = HashMap::new();
        map.insert("resume".to_string(), FormFile::new("resume", "cv.pdf"));

        assert_eq!(map.file_count(), 1);
        assert_eq!(map.get_file("resume").map(|f| f.file_name()), Some("cv.pdf"));
    }

    #[test]
    fn test_metadata() {
        let file = FormFile::new("avatar", "me.png")
            .with_content_type("image/png")
            .with_data(vec![0x89, 0x50, 0x4E, 0x47]);

        let metadata = file.metadata();
        assert_eq!(metadata.size, 4);
        assert_eq!(metadata.content_type.as_deref(), Some("image/png"));
    }
}
