//! Test utilities for database and API testing.
//!
//! This module provides utilities for setting up in-memory SQLite databases
//! with migrations applied, and for driving the router in-process.

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tickets::config::AppConfig;
use tickets::db::{init_pool, run_migrations};
use tickets::server::{AppState, create_app};
use tower::ServiceExt;

/// Configuration pointing at a private in-memory database and `upload_dir`.
#[allow(dead_code)]
pub fn test_config(upload_dir: &Path) -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        upload_dir: upload_dir.to_path_buf(),
        ..Default::default()
    }
}

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let config = AppConfig {
        database_url: "sqlite::memory:".to_string(),
        ..Default::default()
    };

    let db = init_pool(&config).await?;
    run_migrations(&db).await?;

    Ok(db)
}

/// Sets up an in-memory SQLite database with all migrations applied and returns an Arc.
#[allow(dead_code)]
pub async fn setup_test_db_arc() -> Result<Arc<DatabaseConnection>> {
    let db = setup_test_db().await?;
    Ok(Arc::new(db))
}

/// Builds the full application router over a fresh database.
#[allow(dead_code)]
pub async fn setup_test_app(upload_dir: &Path) -> Result<Router> {
    let db = setup_test_db().await?;
    Ok(create_app(AppState::new(test_config(upload_dir), db)))
}

/// Sends a request through the router.
#[allow(dead_code)]
pub async fn send(app: &Router, request: Request<Body>) -> Result<Response<Body>> {
    Ok(app.clone().oneshot(request).await?)
}

/// Sends a JSON request and returns the status with the parsed body (`Null` when empty).
#[allow(dead_code)]
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = send(app, request).await?;
    let status = response.status();
    Ok((status, body_json(response).await?))
}

/// Reads a response body as JSON, treating an empty body as `Null`.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

/// Builds a `multipart/form-data` upload request with a single part.
#[allow(dead_code)]
pub fn multipart_request(uri: &str, field: &str, filename: &str, data: &[u8]) -> Request<Body> {
    const BOUNDARY: &str = "tickets-test-boundary";

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("valid multipart request")
}
