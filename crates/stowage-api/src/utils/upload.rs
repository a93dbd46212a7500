//! Multipart extraction for the upload handler

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use stowage_core::validation::validate_original_filename;
use stowage_core::{AppError, UploadValidator, ValidationError};

/// Name of the multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// The single file part of an upload request, fully received.
#[derive(Debug)]
pub struct ExtractedFile {
    pub data: Bytes,
    /// Client-supplied name, already checked by `validate_original_filename`
    pub filename: String,
    /// Declared part Content-Type, if any
    pub content_type: Option<String>,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        ValidationError::MalformedMultipart(err.body_text()).into()
    }
}

/// Extract the file part from a multipart form.
///
/// Only one field named "file" is accepted; other fields are ignored. The
/// filename is checked before any byte is read and the size limit is
/// enforced per chunk, so an oversize body is rejected without being
/// buffered in full.
pub async fn extract_multipart_file(
    mut multipart: Multipart,
    validator: &UploadValidator,
) -> Result<ExtractedFile, AppError> {
    let mut extracted: Option<ExtractedFile> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        if extracted.is_some() {
            return Err(ValidationError::MultipleFiles.into());
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        validate_original_filename(&filename)?;
        let content_type = field.content_type().map(str::to_string);

        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            validator.check_size_limit(data.len() + chunk.len())?;
            data.extend_from_slice(&chunk);
        }

        tracing::debug!(
            filename = %filename,
            size_bytes = data.len(),
            "Received file part"
        );

        extracted = Some(ExtractedFile {
            data: data.freeze(),
            filename,
            content_type,
        });
    }

    extracted.ok_or_else(|| ValidationError::MissingFile.into())
}
