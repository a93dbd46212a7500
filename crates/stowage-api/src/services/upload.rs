//! Upload service: validation pipeline and store write for one request.

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::{extract_multipart_file, ExtractedFile};
use axum::extract::Multipart;
use chrono::Utc;
use stowage_core::models::UploadedFile;
use stowage_core::validation::{resolve_content_type, sanitize_extension, sanitize_filename};
use stowage_storage::{generate_storage_key, StorageError};

/// Fresh keys tried before a collision is reported as a storage failure.
const MAX_KEY_ATTEMPTS: usize = 3;

pub struct UploadService<'a> {
    state: &'a AppState,
}

impl<'a> UploadService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Receive, validate and store the file part of `multipart`.
    pub async fn upload(&self, multipart: Multipart) -> Result<UploadedFile, HttpAppError> {
        let validator = &self.state.validator;
        let file = extract_multipart_file(multipart, validator).await?;

        validator.validate_file_size(file.data.len())?;

        let extension = sanitize_extension(&file.filename);
        validator.validate_extension(extension.as_deref())?;
        validator.validate_extension_content_type_match(
            file.content_type.as_deref(),
            extension.as_deref(),
        )?;

        let content_type = resolve_content_type(file.content_type.as_deref(), extension.as_deref());
        validator.validate_content_type(&content_type)?;

        let key = self.store(&file, extension.as_deref()).await?;

        let uploaded = UploadedFile {
            key,
            original_filename: sanitize_filename(&file.filename),
            content_type,
            size: file.data.len() as u64,
            uploaded_at: Utc::now(),
        };

        tracing::info!(
            key = %uploaded.key,
            filename = %uploaded.original_filename,
            content_type = %uploaded.content_type,
            size_bytes = uploaded.size,
            "File uploaded"
        );

        Ok(uploaded)
    }

    /// Write the bytes under a freshly generated key. A collision with an
    /// existing key only ever costs a retry with a new key.
    async fn store(
        &self,
        file: &ExtractedFile,
        extension: Option<&str>,
    ) -> Result<String, StorageError> {
        let mut attempt = 1;
        loop {
            let key = generate_storage_key(extension);
            match self.state.storage.put(&key, file.data.clone()).await {
                Ok(()) => return Ok(key),
                Err(StorageError::KeyExists(existing)) if attempt < MAX_KEY_ATTEMPTS => {
                    tracing::warn!(key = %existing, attempt, "Storage key collision, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
