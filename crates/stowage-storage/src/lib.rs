//! Stowage Storage Library
//!
//! This crate provides the upload store abstraction and its local filesystem
//! implementation.
//!
//! # Storage key format
//!
//! Keys are flat names inside a single directory:
//!
//! - `{token}.{ext}` when the original filename carried a safe extension
//! - `{token}` otherwise
//!
//! `token` is the 32-char hex form of a random v4 UUID. Names starting with
//! `.` are reserved for in-flight temporary files and are never valid keys.
//! Key generation is centralized in the `keys` module.

pub mod factory;
pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::generate_storage_key;
pub use local::LocalStorage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
