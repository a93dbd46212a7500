use crate::{LocalStorage, Storage, StorageResult};
use std::sync::Arc;
use std::time::Duration;
use stowage_core::Config;

/// Create the upload store from configuration
///
/// The directory is created if missing and leftover temporary files from a
/// previous run are swept before the store is handed out. Workers sharing the
/// directory never hold a temporary file longer than one request, so only
/// files older than the request timeout count as leftovers.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let storage = LocalStorage::new(config.upload_dir()).await?;

    let older_than = Duration::from_secs(config.request_timeout_secs());
    let swept = storage.sweep_temp_files(older_than).await?;
    if swept > 0 {
        tracing::info!(
            count = swept,
            path = %config.upload_dir().display(),
            "Removed leftover temporary upload files"
        );
    }

    Ok(Arc::new(storage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::temp_file_name;
    use stowage_core::{BaseConfig, LogFormat, UploadServiceConfig};

    fn config_for(upload_dir: &std::path::Path) -> Config {
        Config(Box::new(UploadServiceConfig {
            base: BaseConfig {
                server_port: 8080,
                environment: "test".to_string(),
                cors_origins: vec!["*".to_string()],
                http_concurrency_limit: 16,
                request_timeout_secs: 30,
                log_format: LogFormat::Compact,
            },
            upload_dir: upload_dir.to_path_buf(),
            upload_url_prefix: "/static/uploads".to_string(),
            max_file_size_bytes: 1024 * 1024,
            allowed_extensions: vec![],
            allowed_content_types: vec![],
            strict_content_type_match: false,
        }))
    }

    #[tokio::test]
    async fn test_startup_sweep_spares_sibling_in_flight_write() {
        let dir = tempfile::tempdir().unwrap();
        let in_flight = dir.path().join(temp_file_name());
        std::fs::write(&in_flight, b"partial").unwrap();

        let storage = create_storage(&config_for(dir.path())).await.unwrap();

        assert!(in_flight.exists());
        storage.health_check().await.unwrap();
    }
}
