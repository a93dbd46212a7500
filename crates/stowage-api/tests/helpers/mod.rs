//! Test helpers: build AppState and router for integration tests.
//!
//! Each `TestApp` owns a fresh temporary upload directory, so tests never
//! share store state. Run with `cargo test -p stowage-api`.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use std::path::Path;
use std::sync::Arc;
use stowage_api::setup::routes;
use stowage_api::AppState;
use stowage_core::{BaseConfig, Config, LogFormat, UploadServiceConfig};
use stowage_storage::{LocalStorage, Storage};
use tempfile::TempDir;

/// Test application: server and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn upload_dir(&self) -> &Path {
        self.state.config.upload_dir()
    }

    /// Names of every entry in the upload directory, sorted.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.upload_dir())
            .expect("Failed to read upload directory")
            .map(|entry| {
                entry
                    .expect("Failed to read directory entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }
}

/// Configuration with defaults suitable for tests, rooted at `upload_dir`.
pub fn create_test_config(upload_dir: &Path) -> UploadServiceConfig {
    UploadServiceConfig {
        base: BaseConfig {
            server_port: 8080,
            environment: "test".to_string(),
            cors_origins: vec!["*".to_string()],
            http_concurrency_limit: 64,
            request_timeout_secs: 30,
            log_format: LogFormat::Compact,
        },
        upload_dir: upload_dir.to_path_buf(),
        upload_url_prefix: "/static/uploads".to_string(),
        max_file_size_bytes: 16 * 1024 * 1024,
        allowed_extensions: vec![],
        allowed_content_types: vec![],
        strict_content_type_match: false,
    }
}

/// Setup test app with default configuration.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Setup test app, letting the caller adjust the configuration first.
pub async fn setup_test_app_with(customize: impl FnOnce(&mut UploadServiceConfig)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let upload_dir = temp_dir.path().join("uploads");

    let mut upload_config = create_test_config(&upload_dir);
    customize(&mut upload_config);
    let config = Config(Box::new(upload_config));
    config.validate().expect("Invalid test configuration");

    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(config.upload_dir())
            .await
            .expect("Failed to create local storage"),
    );

    let state = Arc::new(AppState::new(config, storage));
    let app = routes::setup_routes(state.clone()).expect("Failed to setup routes");
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}

/// Multipart form with a single `file` part.
pub fn file_form(filename: &str, data: impl Into<bytes::Bytes>, mime_type: &str) -> MultipartForm {
    let part = Part::bytes(data.into())
        .file_name(filename)
        .mime_type(mime_type);
    MultipartForm::new().add_part("file", part)
}

/// Upload `data` and return the parsed JSON response, asserting success.
pub async fn upload_ok(
    client: &TestServer,
    filename: &str,
    data: &[u8],
    mime_type: &str,
) -> serde_json::Value {
    let response = client
        .post("/upload")
        .multipart(file_form(filename, data.to_vec(), mime_type))
        .await;
    assert_eq!(
        response.status_code(),
        200,
        "upload failed: {}",
        response.text()
    );
    response.json()
}

/// Storage key from an upload response.
pub fn key_of(upload: &serde_json::Value) -> String {
    upload
        .get("key")
        .and_then(|v| v.as_str())
        .expect("Expected 'key' in upload response")
        .to_string()
}
