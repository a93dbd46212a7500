//! Concurrent upload and read integration tests.
//!
//! Run with: `cargo test -p stowage-api --test concurrent_test`

mod helpers;

use axum::http::StatusCode;
use futures::future::join_all;
use helpers::{file_form, key_of, setup_test_app};
use std::collections::HashSet;

#[tokio::test]
async fn test_two_concurrent_uploads_keep_their_own_content() {
    let app = setup_test_app().await;
    let client = app.client();

    let first = async {
        client
            .post("/upload")
            .multipart(file_form("a.txt", b"first upload".to_vec(), "text/plain"))
            .await
    };
    let second = async {
        client
            .post("/upload")
            .multipart(file_form("a.txt", b"second upload".to_vec(), "text/plain"))
            .await
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first.status_code(), StatusCode::OK);
    assert_eq!(second.status_code(), StatusCode::OK);
    let first_key = key_of(&first.json());
    let second_key = key_of(&second.json());
    assert_ne!(first_key, second_key);

    let response = client.get(&format!("/static/uploads/{}", first_key)).await;
    assert_eq!(response.text(), "first upload");
    let response = client.get(&format!("/static/uploads/{}", second_key)).await;
    assert_eq!(response.text(), "second upload");
}

#[tokio::test]
async fn test_many_concurrent_uploads_get_unique_keys() {
    let app = setup_test_app().await;
    let client = app.client();

    let uploads = (0..24).map(|i| async move {
        let body = format!("payload number {}", i);
        let response = client
            .post("/upload")
            .multipart(file_form("same.txt", body.clone().into_bytes(), "text/plain"))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        (key_of(&response.json()), body)
    });
    let results = join_all(uploads).await;

    let keys: HashSet<&String> = results.iter().map(|(key, _)| key).collect();
    assert_eq!(keys.len(), results.len());

    for (key, body) in &results {
        let response = client.get(&format!("/static/uploads/{}", key)).await;
        assert_eq!(&response.text(), body);
    }

    // No temporary files survive completed uploads.
    let stored = app.stored_files();
    assert_eq!(stored.len(), results.len());
    assert!(stored.iter().all(|name| !name.starts_with('.')));
}
