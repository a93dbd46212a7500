//! Data models for the upload service

mod upload;

pub use upload::{UploadResponse, UploadedFile};
