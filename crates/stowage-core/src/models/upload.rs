use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One stored artifact. Created once the bytes are published in the store;
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Generated storage key (unique, traversal-free)
    pub key: String,
    /// Sanitized form of the client-supplied filename
    pub original_filename: String,
    pub content_type: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

impl UploadedFile {
    /// Public path the file is served from.
    pub fn public_url(&self, url_prefix: &str) -> String {
        format!("{}/{}", url_prefix.trim_end_matches('/'), self.key)
    }

    pub fn to_response(&self, url_prefix: &str) -> UploadResponse {
        UploadResponse {
            key: self.key.clone(),
            url: self.public_url(url_prefix),
            filename: self.original_filename.clone(),
            content_type: self.content_type.clone(),
            size: self.size,
            uploaded_at: self.uploaded_at,
        }
    }
}

/// Response body of a successful upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Storage key to retrieve the file with
    #[schema(example = "9b2f6c0e7d3a4e1f8c5b2a9d6e3f0c1b.txt")]
    pub key: String,
    /// Public path of the stored file
    #[schema(example = "/static/uploads/9b2f6c0e7d3a4e1f8c5b2a9d6e3f0c1b.txt")]
    pub url: String,
    /// Sanitized original filename
    pub filename: String,
    pub content_type: String,
    /// Size in bytes
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}
