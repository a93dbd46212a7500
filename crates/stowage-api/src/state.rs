//! Application state shared by all handlers.

use std::sync::Arc;
use stowage_core::{Config, UploadValidator};
use stowage_storage::Storage;

/// Everything a request needs, passed explicitly through axum's `State`.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub validator: UploadValidator,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Self {
        let validator = UploadValidator::from_config(&config);
        Self {
            config,
            storage,
            validator,
        }
    }
}
