//! HTTP-level tests for attachment upload, listing and deletion.

#[path = "test_utils/mod.rs"]
mod test_utils;

use std::path::Path;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tempfile::TempDir;
use test_utils::{body_json, multipart_request, send, send_json, setup_test_app};

#[tokio::test]
async fn upload_stores_file_with_timestamp_prefix() -> Result<()> {
    let dir = TempDir::new()?;
    let app = setup_test_app(dir.path()).await?;

    let response = send(
        &app,
        multipart_request("/api/tickets/3/attachments", "file", "report.pdf", b"%PDF-1.7"),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let attachment = body_json(response).await?;

    assert_eq!(attachment["ticketId"], 3);
    assert_eq!(attachment["filename"], "report.pdf");

    let filepath = attachment["filepath"].as_str().unwrap();
    let stored_name = Path::new(filepath).file_name().unwrap().to_str().unwrap();
    let (prefix, rest) = stored_name.split_once('_').unwrap();
    assert_eq!(prefix.len(), 14);
    assert!(prefix.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(rest, "report.pdf");
    assert!(Path::new(filepath).starts_with(dir.path()));
    assert_eq!(std::fs::read(filepath)?, b"%PDF-1.7");

    Ok(())
}

#[tokio::test]
async fn upload_strips_client_directories() -> Result<()> {
    let dir = TempDir::new()?;
    let app = setup_test_app(dir.path()).await?;

    let response = send(
        &app,
        multipart_request("/api/tickets/1/attachments", "file", "..\\..\\boot.ini", b"x"),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let attachment = body_json(response).await?;
    assert_eq!(attachment["filename"], "boot.ini");
    let filepath = attachment["filepath"].as_str().unwrap();
    assert_eq!(Path::new(filepath).parent().unwrap(), dir.path());

    Ok(())
}

#[tokio::test]
async fn upload_without_file_part_is_bad_request() -> Result<()> {
    let dir = TempDir::new()?;
    let app = setup_test_app(dir.path()).await?;

    let response = send(
        &app,
        multipart_request("/api/tickets/1/attachments", "document", "report.pdf", b"x"),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await?;
    assert_eq!(error["code"], "VALIDATION_FAILED");

    let request = Request::builder()
        .method("POST")
        .uri("/api/tickets/1/attachments")
        .header("content-type", "application/json")
        .body(Body::from("{}"))?;
    let response = send(&app, request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn upload_with_non_numeric_ticket_is_bad_request() -> Result<()> {
    let dir = TempDir::new()?;
    let app = setup_test_app(dir.path()).await?;

    let response = send(
        &app,
        multipart_request("/api/tickets/abc/attachments", "file", "a.txt", b"x"),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn attachments_list_in_upload_order() -> Result<()> {
    let dir = TempDir::new()?;
    let app = setup_test_app(dir.path()).await?;

    for name in ["a.txt", "b.txt", "c.txt"] {
        let response = send(
            &app,
            multipart_request("/api/tickets/9/attachments", "file", name, name.as_bytes()),
        )
        .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let (status, list) = send_json(&app, "GET", "/api/tickets/9/attachments", None).await?;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|attachment| attachment["filename"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    Ok(())
}

#[tokio::test]
async fn delete_removes_row_and_file() -> Result<()> {
    let dir = TempDir::new()?;
    let app = setup_test_app(dir.path()).await?;

    let response = send(
        &app,
        multipart_request("/api/tickets/2/attachments", "file", "notes.txt", b"hello"),
    )
    .await?;
    let attachment = body_json(response).await?;
    let filepath = attachment["filepath"].as_str().unwrap().to_string();
    assert!(Path::new(&filepath).exists());

    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/api/attachments/{}", attachment["id"]),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert!(!Path::new(&filepath).exists());
    let (_, list) = send_json(&app, "GET", "/api/tickets/2/attachments", None).await?;
    assert_eq!(list.as_array().unwrap().len(), 0);

    let (status, _) = send_json(&app, "DELETE", "/api/attachments/424242", None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    Ok(())
}
