//! Upload store setup and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use stowage_core::Config;
use stowage_storage::{create_storage, Storage};

/// Create the upload directory if needed, sweep leftovers and open the store.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!(
        path = %config.upload_dir().display(),
        "Initializing upload store..."
    );

    let storage = create_storage(config)
        .await
        .context("Failed to initialize upload store")?;

    storage
        .health_check()
        .await
        .context("Upload directory is not writable")?;

    tracing::info!("Upload store initialized successfully");

    Ok(storage)
}
