//! # Comments API Handlers

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiError, parse_id};
use crate::models::activity::kind;
use crate::models::comment::Model as CommentModel;
use crate::repositories::NewComment;
use crate::server::AppState;

/// Request payload for adding a comment. The ticket comes from the path;
/// a body `ticketId` is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CommentPayload {
    #[schema(example = "alice")]
    pub author: String,
    #[schema(example = "Rebooted the router, still down.")]
    pub text: String,
}

/// Comment as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i32,
    pub ticket_id: i32,
    pub author: String,
    pub text: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

impl From<CommentModel> for CommentResponse {
    fn from(comment: CommentModel) -> Self {
        Self {
            id: comment.id,
            ticket_id: comment.ticket_id,
            author: comment.author,
            text: comment.text,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

/// List the comments of a ticket, oldest first
#[utoipa::path(
    get,
    path = "/api/tickets/{id}/comments",
    params(("id" = String, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Comments of the ticket", body = [CommentResponse]),
        (status = 400, description = "Invalid ticket id", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let ticket_id = parse_id(&ticket_id, "ticket_id")?;

    let comments = state.comments.list_by_ticket(ticket_id).await?;

    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

/// Add a comment to a ticket
#[utoipa::path(
    post,
    path = "/api/tickets/{id}/comments",
    params(("id" = String, Path, description = "Ticket id")),
    request_body = CommentPayload,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Invalid ticket id or malformed body", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "comments"
)]
pub async fn create_comment(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
    payload: Result<Json<CommentPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let ticket_id = parse_id(&ticket_id, "ticket_id")?;
    let Json(payload) = payload?;

    let comment = state
        .comments
        .create(NewComment {
            ticket_id,
            author: payload.author,
            text: payload.text,
        })
        .await?;
    tracing::info!(comment_id = comment.id, ticket_id, "Comment added");

    state
        .activities
        .record_best_effort(ticket_id, kind::COMMENT_ADDED, "Comment added")
        .await;

    Ok((StatusCode::CREATED, Json(comment.into())))
}
