//! Stowage API Library
//!
//! This crate provides the HTTP handlers, middleware, and application setup
//! for the upload service.

// Module declarations
pub mod api_doc;
mod handlers;
mod middleware;
mod services;
pub mod setup;
mod telemetry;
mod utils;

// Public modules
pub mod error;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
