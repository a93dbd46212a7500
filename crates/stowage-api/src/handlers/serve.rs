//! Read-only file serving by storage key.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::Response,
};
use futures::StreamExt;
use std::sync::Arc;
use stowage_core::validation::{content_type_for_key, is_inline_safe, validate_storage_key};
use stowage_core::AppError;

/// Content under a key never changes.
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

fn content_disposition(key: &str, content_type: &str) -> String {
    let disposition = if is_inline_safe(content_type) {
        "inline"
    } else {
        "attachment"
    };
    format!("{}; filename=\"{}\"", disposition, key)
}

/// Serve a stored file
#[utoipa::path(
    get,
    path = "/static/uploads/{key}",
    tag = "files",
    params(
        ("key" = String, Path, description = "Storage key returned by the upload endpoint")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 400, description = "Malformed storage key", body = ErrorResponse),
        (status = 404, description = "No file stored under this key", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "serve_file"))]
pub async fn serve_file(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    method: Method,
) -> Result<Response, HttpAppError> {
    validate_storage_key(&key)?;

    let size = state.storage.content_length(&key).await?;
    let content_type = content_type_for_key(&key);

    let body = if method == Method::HEAD {
        Body::empty()
    } else {
        let stream = state.storage.get_stream(&key).await?;
        Body::from_stream(stream.map(|result| {
            result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
        }))
    };

    let disposition = HeaderValue::from_str(&content_disposition(&key, &content_type))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_str())
        .header(header::CONTENT_LENGTH, size)
        .header(header::CACHE_CONTROL, IMMUTABLE_CACHE_CONTROL)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(body)
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError::from(AppError::Internal(e.to_string()))
        })?;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("abc.png", "image/png"),
            "inline; filename=\"abc.png\""
        );
        assert_eq!(
            content_disposition("abc.html", "text/html"),
            "attachment; filename=\"abc.html\""
        );
    }
}
