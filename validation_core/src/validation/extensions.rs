//! File name extension allow-list

use super::FieldValue;

pub const DEFAULT_EXTENSIONS: &str = "png,jpg,jpeg,gif";

pub const DEFAULT_EXTENSIONS_MESSAGE: &str =
    "The {0} field only accepts files with the following extensions: {1}";

/// Matches file names against a comma separated list of accepted extensions.
///
/// Entries are compared case-insensitively and may be written with or without
/// a leading dot. A blank list falls back to [`DEFAULT_EXTENSIONS`].
#[derive(Debug, Clone)]
pub struct FileExtensionsRule {
    extensions: Option<String>,
    error_message: String,
}

impl Default for FileExtensionsRule {
    fn default() -> Self {
        Self {
            extensions: None,
            error_message: DEFAULT_EXTENSIONS_MESSAGE.to_string(),
        }
    }
}

impl FileExtensionsRule {
    pub fn new(extensions: impl Into<String>) -> Self {
        let mut rule = Self::default();
        rule.set_extensions(extensions);
        rule
    }

    /// The configured list, or the default one when nothing usable was set.
    pub fn extensions(&self) -> &str {
        match &self.extensions {
            Some(extensions) if !parse_extensions(extensions).is_empty() => extensions,
            _ => DEFAULT_EXTENSIONS,
        }
    }

    pub fn set_extensions(&mut self, extensions: impl Into<String>) {
        self.extensions = Some(extensions.into());
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn set_error_message(&mut self, message: impl Into<String>) {
        self.error_message = message.into();
    }

    /// Lowercased entries without leading dots.
    pub fn parsed_extensions(&self) -> Vec<String> {
        parse_extensions(self.extensions())
    }

    /// Entries as shown to users, e.g. `.png, .jpg`.
    pub fn formatted_extensions(&self) -> String {
        self.parsed_extensions()
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Substitutes `{0}` with `name` and `{1}` with the dotted list in one pass,
    /// so placeholder text inside either argument is left as is.
    pub fn format_error_message(&self, name: &str) -> String {
        let extensions = self.formatted_extensions();
        let mut message = String::with_capacity(self.error_message.len() + name.len() + extensions.len());
        let mut rest = self.error_message.as_str();

        while let Some(start) = rest.find('{') {
            message.push_str(&rest[..start]);
            let tail = &rest[start..];
            if let Some(after) = tail.strip_prefix("{0}") {
                message.push_str(name);
                rest = after;
            } else if let Some(after) = tail.strip_prefix("{1}") {
                message.push_str(&extensions);
                rest = after;
            } else {
                message.push('{');
                rest = &tail[1..];
            }
        }
        message.push_str(rest);
        message
    }

    pub fn is_valid_file_name(&self, file_name: &str) -> bool {
        match file_extension(file_name) {
            Some(ext) => {
                let ext = ext.to_lowercase();
                self.parsed_extensions().iter().any(|allowed| *allowed == ext)
            }
            None => false,
        }
    }

    /// Missing values pass, text is treated as a file name, anything else fails.
    pub fn is_valid(&self, value: &FieldValue<'_>) -> bool {
        match value {
            FieldValue::Missing | FieldValue::Value(serde_json::Value::Null) => true,
            FieldValue::File(file) => self.is_valid_file_name(file.file_name()),
            FieldValue::Text(text) => self.is_valid_file_name(text),
            FieldValue::Value(serde_json::Value::String(text)) => self.is_valid_file_name(text),
            FieldValue::Value(_) => false,
        }
    }
}

fn parse_extensions(extensions: &str) -> Vec<String> {
    extensions
        .split(',')
        .map(|entry| entry.trim().trim_start_matches('.').to_lowercase())
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Suffix after the last dot of the final path component, if non-empty.
pub fn file_extension(file_name: &str) -> Option<&str> {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name);

    match base.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext),
        _ => None,
    }
}
