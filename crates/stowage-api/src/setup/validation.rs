//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use stowage_core::Config;

/// Validate critical configuration values
///
/// Fails on values that would break routing or leak in production; warns on
/// settings that are legal but usually unintended.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.allowed_extensions().is_empty() {
        tracing::warn!(
            "No ALLOWED_EXTENSIONS configured in production - any file type will be accepted"
        );
    }

    if config.upload_dir().is_relative() {
        tracing::debug!(
            path = %config.upload_dir().display(),
            "UPLOAD_DIR is relative to the working directory"
        );
    }

    if config.max_file_size_bytes() > 1024 * 1024 * 1024 {
        tracing::warn!(
            max_file_size_bytes = config.max_file_size_bytes(),
            "MAX_FILE_SIZE_MB above 1 GiB - uploads are buffered in memory before being stored"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use stowage_core::{BaseConfig, LogFormat, UploadServiceConfig};

    fn production_config(cors_origins: Vec<String>) -> Config {
        Config(Box::new(UploadServiceConfig {
            base: BaseConfig {
                server_port: 8080,
                environment: "production".to_string(),
                cors_origins,
                http_concurrency_limit: 16,
                request_timeout_secs: 30,
                log_format: LogFormat::Json,
            },
            upload_dir: PathBuf::from("/srv/uploads"),
            upload_url_prefix: "/static/uploads".to_string(),
            max_file_size_bytes: 16 * 1024 * 1024,
            allowed_extensions: vec!["pdf".to_string()],
            allowed_content_types: vec![],
            strict_content_type_match: false,
        }))
    }

    #[test]
    fn test_production_mode_comes_from_config() {
        let config = production_config(vec!["https://example.com".to_string()]);
        assert!(config.is_production());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let config = production_config(vec!["*".to_string()]);
        assert!(validate_config(&config).is_err());
    }
}
