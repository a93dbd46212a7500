//! Validation modules
//!
//! Pure checks over untrusted upload input. The upload receiver runs them
//! before any byte reaches the store.

pub mod content_type;
pub mod filename;
pub mod key;

pub use content_type::{content_type_for_key, is_inline_safe, resolve_content_type};
pub use filename::{
    contains_path_traversal, sanitize_extension, sanitize_filename, validate_original_filename,
};
pub use key::{is_valid_storage_key, validate_storage_key, KeyError, MAX_KEY_LENGTH};

/// Upload validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("No file part")]
    MissingFile,

    #[error("No selected file")]
    MissingFilename,

    #[error("Multiple file fields are not allowed; send exactly one field named 'file'")]
    MultipleFiles,

    #[error("Malformed multipart body: {0}")]
    MalformedMultipart(String),

    #[error("File is empty")]
    EmptyFile,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Invalid file type: '{extension}' (allowed: {})", .allowed.join(", "))]
    ExtensionNotAllowed {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid content type: '{content_type}' (allowed: {})", .allowed.join(", "))]
    ContentTypeNotAllowed {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Content type '{content_type}' does not match extension '{extension}' (expected one of: {})", .expected.join(", "))]
    ContentTypeMismatch {
        content_type: String,
        extension: String,
        expected: Vec<String>,
    },
}

/// Upload policy validator
///
/// Holds the configured limits and allow-lists. Empty allow-lists mean no
/// policy is configured for that dimension.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
    strict_content_type_match: bool,
}

impl UploadValidator {
    pub fn new(
        max_file_size: usize,
        allowed_extensions: Vec<String>,
        allowed_content_types: Vec<String>,
        strict_content_type_match: bool,
    ) -> Self {
        Self {
            max_file_size,
            allowed_extensions,
            allowed_content_types,
            strict_content_type_match,
        }
    }

    pub fn from_config(config: &crate::Config) -> Self {
        Self::new(
            config.max_file_size_bytes(),
            config.allowed_extensions().to_vec(),
            config.allowed_content_types().to_vec(),
            config.strict_content_type_match(),
        )
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Reject once `size` passes the limit. Used while the body is still streaming.
    pub fn check_size_limit(&self, size: usize) -> Result<(), ValidationError> {
        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }
        Ok(())
    }

    /// Validate the final file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }
        self.check_size_limit(size)
    }

    /// Validate the sanitized extension against the allow-list
    pub fn validate_extension(&self, extension: Option<&str>) -> Result<(), ValidationError> {
        if self.allowed_extensions.is_empty() {
            return Ok(());
        }

        match extension {
            Some(ext) if self.allowed_extensions.iter().any(|a| a == ext) => Ok(()),
            _ => Err(ValidationError::ExtensionNotAllowed {
                extension: extension.unwrap_or("").to_string(),
                allowed: self.allowed_extensions.clone(),
            }),
        }
    }

    /// Validate a resolved (normalized) content type against the allow-list
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        if self.allowed_content_types.is_empty() {
            return Ok(());
        }

        let normalized = content_type::normalize_mime_type(content_type);
        if !self.allowed_content_types.iter().any(|ct| ct == &normalized) {
            return Err(ValidationError::ContentTypeNotAllowed {
                content_type: normalized,
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// With strict matching on, a declared type must be one of the extension's
    /// known types. Generic declarations and unknown extensions pass.
    pub fn validate_extension_content_type_match(
        &self,
        declared: Option<&str>,
        extension: Option<&str>,
    ) -> Result<(), ValidationError> {
        if !self.strict_content_type_match {
            return Ok(());
        }

        let (Some(declared), Some(extension)) = (declared, extension) else {
            return Ok(());
        };
        if content_type::is_generic(declared) {
            return Ok(());
        }

        let expected = content_type::expected_types_for_extension(extension);
        if expected.is_empty() {
            tracing::debug!(
                extension = %extension,
                content_type = %declared,
                "Unknown extension, skipping Content-Type/extension cross-validation"
            );
            return Ok(());
        }

        let normalized = content_type::normalize_mime_type(declared);
        if !expected.iter().any(|ct| ct == &normalized) {
            return Err(ValidationError::ContentTypeMismatch {
                content_type: normalized,
                extension: extension.to_string(),
                expected,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_validator() -> UploadValidator {
        UploadValidator::new(
            1024 * 1024,
            vec!["epub".to_string(), "txt".to_string()],
            vec!["application/epub+zip".to_string(), "text/plain".to_string()],
            true,
        )
    }

    #[test]
    fn test_validate_file_size() {
        let validator = test_validator();
        assert!(validator.validate_file_size(512 * 1024).is_ok());
        assert!(validator.validate_file_size(1024 * 1024).is_ok());
        assert!(matches!(
            validator.validate_file_size(1024 * 1024 + 1),
            Err(ValidationError::FileTooLarge { .. })
        ));
        assert!(matches!(
            validator.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        ));
    }

    #[test]
    fn test_check_size_limit_allows_zero_while_streaming() {
        assert!(test_validator().check_size_limit(0).is_ok());
    }

    #[test]
    fn test_validate_extension() {
        let validator = test_validator();
        assert!(validator.validate_extension(Some("epub")).is_ok());
        assert!(matches!(
            validator.validate_extension(Some("exe")),
            Err(ValidationError::ExtensionNotAllowed { .. })
        ));
        assert!(validator.validate_extension(None).is_err());
    }

    #[test]
    fn test_no_policy_accepts_anything() {
        let validator = UploadValidator::new(10, vec![], vec![], false);
        assert!(validator.validate_extension(None).is_ok());
        assert!(validator.validate_extension(Some("exe")).is_ok());
        assert!(validator.validate_content_type("application/x-anything").is_ok());
        assert!(validator
            .validate_extension_content_type_match(Some("image/png"), Some("txt"))
            .is_ok());
    }

    #[test]
    fn test_validate_content_type() {
        let validator = test_validator();
        assert!(validator.validate_content_type("text/plain").is_ok());
        assert!(validator
            .validate_content_type("TEXT/PLAIN; charset=utf-8")
            .is_ok());
        assert!(matches!(
            validator.validate_content_type("image/png"),
            Err(ValidationError::ContentTypeNotAllowed { .. })
        ));
    }

    #[test]
    fn test_strict_match() {
        let validator = test_validator();
        assert!(validator
            .validate_extension_content_type_match(Some("text/plain"), Some("txt"))
            .is_ok());
        assert!(matches!(
            validator.validate_extension_content_type_match(Some("image/png"), Some("txt")),
            Err(ValidationError::ContentTypeMismatch { .. })
        ));
        assert!(validator
            .validate_extension_content_type_match(Some("application/octet-stream"), Some("txt"))
            .is_ok());
        assert!(validator
            .validate_extension_content_type_match(Some("application/x-foo"), Some("zzzunknown"))
            .is_ok());
        assert!(validator
            .validate_extension_content_type_match(None, Some("txt"))
            .is_ok());
    }

    #[test]
    fn test_messages_match_upload_contract() {
        assert_eq!(ValidationError::MissingFile.to_string(), "No file part");
        assert_eq!(ValidationError::MissingFilename.to_string(), "No selected file");
    }
}
