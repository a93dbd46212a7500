use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::UploadService;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use std::sync::Arc;
use stowage_core::models::UploadResponse;
use stowage_core::ValidationError;

/// Upload a single file
///
/// Accepts `multipart/form-data` with exactly one file field named `file`.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "Missing, empty or invalid file", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Content type not allowed", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
        (status = 507, description = "Upload directory is full", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_file"))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let multipart = multipart.map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "Request is not a multipart form");
        HttpAppError::from(ValidationError::MissingFile)
    })?;

    let uploaded = UploadService::new(&state).upload(multipart).await?;

    Ok(Json(uploaded.to_response(state.config.upload_url_prefix())))
}
