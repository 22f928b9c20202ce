//! Shared helpers for exercising the real router in tests.

use crate::{
    AppState,
    services::{gallery_service::GalleryService, storage_service::StorageService},
};
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use serde_json::Value;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::sync::Arc;
use url::Url;

pub const TEST_PUBLIC_URL: &str = "http://localhost:3000";

/// In-memory SQLite pool with the schema applied. A single connection keeps
/// every query on the same in-memory database.
pub async fn test_pool() -> Arc<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");
    crate::run_migrations(&pool)
        .await
        .expect("apply test schema");
    Arc::new(pool)
}

/// A router wired to fresh in-memory state. The temp dir must outlive the
/// test, so it rides along.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    _storage_dir: tempfile::TempDir,
}

pub async fn test_app() -> TestApp {
    let db = test_pool().await;
    let storage_dir = tempfile::tempdir().expect("create temp storage dir");

    let state = AppState {
        gallery: GalleryService::new(db),
        storage: StorageService::new(
            storage_dir.path().to_path_buf(),
            Url::parse(TEST_PUBLIC_URL).unwrap(),
        ),
        site_name: "Test Gallery".into(),
    };

    TestApp {
        app: crate::routes::routes::routes().with_state(state.clone()),
        state,
        _storage_dir: storage_dir,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Multipart upload request with a single `file` field.
pub fn upload_request(uri: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "test-boundary-7MA4YWxkTrZu0gW";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(header::COOKIE, "session=test-session")
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("parse response JSON")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body")
        .to_vec()
}
