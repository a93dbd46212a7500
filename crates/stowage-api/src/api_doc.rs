//! OpenAPI documentation.
//! The serve path in handler annotations uses the default public prefix; it is
//! rewritten at runtime to the configured `UPLOAD_URL_PREFIX`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use stowage_core::models;

/// Prefix used in handler path annotations (utoipa requires compile-time literals).
const OPENAPI_PREFIX_PLACEHOLDER: &str = "/static/uploads";

/// Rewrite path keys from the placeholder prefix to the configured one.
fn transform_openapi_paths(spec: &mut utoipa::openapi::OpenApi, url_prefix: &str) {
    if OPENAPI_PREFIX_PLACEHOLDER == url_prefix {
        return;
    }
    let path_map = std::mem::take(&mut spec.paths.paths);
    for (key, item) in path_map {
        let new_key = match key.strip_prefix(OPENAPI_PREFIX_PLACEHOLDER) {
            Some(rest) if rest.starts_with('/') => format!("{}{}", url_prefix, rest),
            _ => key,
        };
        spec.paths.paths.insert(new_key, item);
    }
}

/// Returns the OpenAPI spec with the serve path under `url_prefix`.
pub fn get_openapi_spec(url_prefix: &str) -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    transform_openapi_paths(&mut spec, url_prefix);
    spec
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stowage API",
        version = "0.1.0",
        description = "Minimal file upload service: accepts single-file multipart uploads, stores them under generated keys and serves them back read-only."
    ),
    paths(
        handlers::upload::upload_file,
        handlers::serve::serve_file,
    ),
    components(
        schemas(
            models::UploadResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "uploads", description = "File upload"),
        (name = "files", description = "Stored file retrieval")
    )
)]
pub struct ApiDoc;
