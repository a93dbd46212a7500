//! Stowage Core Library
//!
//! This crate provides the domain model, error types, configuration, and
//! validation shared by the storage backend and the HTTP service.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, LogFormat, UploadServiceConfig, UPLOAD_ROUTE};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use validation::{KeyError, UploadValidator, ValidationError};
