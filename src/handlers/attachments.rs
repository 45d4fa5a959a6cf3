//! # Attachments API Handlers
//!
//! Multipart upload, listing and deletion of files attached to tickets.

use axum::{
    extract::{
        Multipart, Path, State,
        multipart::MultipartRejection,
    },
    http::StatusCode,
    response::Json,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::error::{ApiError, parse_id, validation_error};
use crate::models::attachment::Model as AttachmentModel;
use crate::server::AppState;

/// Name of the multipart part that carries the file
pub const FILE_FIELD: &str = "file";

/// Multipart form accepted by the upload endpoint
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct AttachmentUpload {
    /// File contents; the part's file name becomes the attachment name
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Attachment as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResponse {
    pub id: i32,
    pub ticket_id: i32,
    #[schema(example = "report.pdf")]
    pub filename: String,
    #[schema(example = "uploads/20240309070502_report.pdf")]
    pub filepath: String,
    #[schema(value_type = String, format = DateTime)]
    pub uploaded_at: DateTimeWithTimeZone,
}

impl From<AttachmentModel> for AttachmentResponse {
    fn from(attachment: AttachmentModel) -> Self {
        Self {
            id: attachment.id,
            ticket_id: attachment.ticket_id,
            filename: attachment.filename,
            filepath: attachment.filepath,
            uploaded_at: attachment.uploaded_at,
        }
    }
}

/// Upload a file and attach it to a ticket
#[utoipa::path(
    post,
    path = "/api/tickets/{id}/attachments",
    params(("id" = String, Path, description = "Ticket id")),
    request_body(content = AttachmentUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Attachment stored", body = AttachmentResponse),
        (status = 400, description = "Invalid ticket id, missing file part or bad file name", body = ApiError),
        (status = 500, description = "Storage or database failure", body = ApiError)
    ),
    tag = "attachments"
)]
pub async fn upload_attachment(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<AttachmentResponse>), ApiError> {
    let ticket_id = parse_id(&ticket_id, "ticket_id")?;
    let mut multipart = multipart?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        upload = Some((filename, data));
        break;
    }

    let Some((filename, data)) = upload else {
        return Err(validation_error(
            "Missing file upload",
            json!({ "field": FILE_FIELD }),
        ));
    };

    let attachment = state.attachments.store(ticket_id, &filename, &data).await?;

    Ok((StatusCode::CREATED, Json(attachment.into())))
}

/// List the attachments of a ticket, oldest upload first
#[utoipa::path(
    get,
    path = "/api/tickets/{id}/attachments",
    params(("id" = String, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Attachments of the ticket", body = [AttachmentResponse]),
        (status = 400, description = "Invalid ticket id", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "attachments"
)]
pub async fn list_attachments(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> Result<Json<Vec<AttachmentResponse>>, ApiError> {
    let ticket_id = parse_id(&ticket_id, "ticket_id")?;

    let attachments = state.attachments.list_by_ticket(ticket_id).await?;

    Ok(Json(
        attachments
            .into_iter()
            .map(AttachmentResponse::from)
            .collect(),
    ))
}

/// Delete an attachment and its stored file
#[utoipa::path(
    delete,
    path = "/api/attachments/{attachment_id}",
    params(("attachment_id" = String, Path, description = "Attachment id")),
    responses(
        (status = 204, description = "Attachment deleted (or already absent)"),
        (status = 400, description = "Invalid attachment id", body = ApiError),
        (status = 500, description = "Storage or database failure", body = ApiError)
    ),
    tag = "attachments"
)]
pub async fn delete_attachment(
    State(state): State<AppState>,
    Path(attachment_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let attachment_id = parse_id(&attachment_id, "attachment_id")?;

    if !state.attachments.delete(attachment_id).await? {
        tracing::debug!(attachment_id, "Delete matched no attachment");
    }

    Ok(StatusCode::NO_CONTENT)
}
