//! Configuration module
//!
//! This module provides the configuration structures for the upload service:
//! server binding, the upload store location, and the upload policy.

use std::env;
use std::path::PathBuf;

// Common constants
const SERVER_PORT: u16 = 8080;
const MAX_FILE_SIZE_MB: usize = 16;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const UPLOAD_DIR: &str = "static/uploads";
const UPLOAD_URL_PREFIX: &str = "/static/uploads";

/// Path the upload receiver is mounted on. The public prefix must not shadow it.
pub const UPLOAD_ROUTE: &str = "/upload";

/// Log output format for the console subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" | "" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!(
                "LOG_FORMAT must be 'compact' or 'json' (got '{}')",
                other
            )),
        }
    }
}

/// Base configuration: process-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub http_concurrency_limit: usize,
    pub request_timeout_secs: u64,
    pub log_format: LogFormat,
}

/// Upload store and upload policy configuration
#[derive(Clone, Debug)]
pub struct UploadServiceConfig {
    pub base: BaseConfig,
    pub upload_dir: PathBuf,
    pub upload_url_prefix: String,
    pub max_file_size_bytes: usize,
    /// Empty means any extension is accepted.
    pub allowed_extensions: Vec<String>,
    /// Empty means any content type is accepted.
    pub allowed_content_types: Vec<String>,
    pub strict_content_type_match: bool,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<UploadServiceConfig>);

impl Config {
    fn as_upload(&self) -> &UploadServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.as_upload().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = UploadServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_upload().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_upload().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.as_upload().base.environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_upload().base.cors_origins
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.as_upload().base.http_concurrency_limit
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.as_upload().base.request_timeout_secs
    }

    pub fn log_format(&self) -> LogFormat {
        self.as_upload().base.log_format
    }

    pub fn upload_dir(&self) -> &std::path::Path {
        &self.as_upload().upload_dir
    }

    /// Public path prefix for stored files, without a trailing slash.
    pub fn upload_url_prefix(&self) -> &str {
        self.as_upload().upload_url_prefix.trim_end_matches('/')
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_upload().max_file_size_bytes
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.as_upload().allowed_extensions
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.as_upload().allowed_content_types
    }

    pub fn strict_content_type_match(&self) -> bool {
        self.as_upload().strict_content_type_match
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

/// Split a comma separated env value into trimmed, lowercased, non-empty items.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(raw: &str, default: bool) -> bool {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

impl UploadServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("MAX_FILE_SIZE_MB must be a valid number"))?;

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(REQUEST_TIMEOUT_SECS)
                .max(1),
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_default()
                .parse()?,
        };

        let config = UploadServiceConfig {
            base,
            upload_dir: env::var("UPLOAD_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(UPLOAD_DIR)),
            upload_url_prefix: env::var("UPLOAD_URL_PREFIX")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UPLOAD_URL_PREFIX.to_string()),
            max_file_size_bytes: max_file_size_mb.saturating_mul(1024 * 1024),
            allowed_extensions: parse_list(&env::var("ALLOWED_EXTENSIONS").unwrap_or_default()),
            allowed_content_types: parse_list(
                &env::var("ALLOWED_CONTENT_TYPES").unwrap_or_default(),
            ),
            strict_content_type_match: parse_bool(
                &env::var("STRICT_CONTENT_TYPE_MATCH").unwrap_or_default(),
                false,
            ),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.server_port == 0 {
            return Err(anyhow::anyhow!("PORT cannot be 0"));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.upload_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_DIR cannot be empty"));
        }

        let prefix = self.upload_url_prefix.trim_end_matches('/');
        if !prefix.starts_with('/') || prefix.is_empty() {
            return Err(anyhow::anyhow!(
                "UPLOAD_URL_PREFIX must be an absolute path other than '/' (got '{}')",
                self.upload_url_prefix
            ));
        }
        if prefix.contains("..") || prefix.contains('{') || prefix.contains('}') {
            return Err(anyhow::anyhow!(
                "UPLOAD_URL_PREFIX contains invalid characters: '{}'",
                self.upload_url_prefix
            ));
        }
        if prefix == UPLOAD_ROUTE {
            return Err(anyhow::anyhow!(
                "UPLOAD_URL_PREFIX cannot be '{}' (reserved for uploads)",
                UPLOAD_ROUTE
            ));
        }

        if is_production_name(&self.base.environment)
            && self.base.cors_origins.iter().any(|o| o == "*")
        {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> UploadServiceConfig {
        UploadServiceConfig {
            base: BaseConfig {
                server_port: 8080,
                environment: "development".to_string(),
                cors_origins: vec!["*".to_string()],
                http_concurrency_limit: 16,
                request_timeout_secs: 30,
                log_format: LogFormat::Compact,
            },
            upload_dir: PathBuf::from("static/uploads"),
            upload_url_prefix: "/static/uploads".to_string(),
            max_file_size_bytes: 1024 * 1024,
            allowed_extensions: vec![],
            allowed_content_types: vec![],
            strict_content_type_match: false,
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_size_limit() {
        let mut config = test_config();
        config.max_file_size_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_prefix() {
        for prefix in ["static/uploads", "/", "/upload", "/static/../etc"] {
            let mut config = test_config();
            config.upload_url_prefix = prefix.to_string();
            assert!(config.validate().is_err(), "prefix {prefix} should be rejected");
        }
    }

    #[test]
    fn test_validate_rejects_wildcard_cors_in_production() {
        let mut config = test_config();
        config.base.environment = "production".to_string();
        assert!(config.validate().is_err());

        config.base.cors_origins = vec!["https://example.com".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_url_prefix_trailing_slash_trimmed() {
        let mut inner = test_config();
        inner.upload_url_prefix = "/files/".to_string();
        let config = Config(Box::new(inner));
        assert_eq!(config.upload_url_prefix(), "/files");
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list(" EPUB, .pdf ,,"), vec!["epub", "pdf"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE", false));
        assert!(!parse_bool("off", true));
        assert!(parse_bool("garbage", true));
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
