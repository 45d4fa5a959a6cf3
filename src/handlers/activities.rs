//! # Activities API Handlers
//!
//! Read access to a ticket's activity log, plus a passthrough endpoint for
//! clients that want to append their own entries.

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiError, parse_id};
use crate::models::activity::Model as ActivityModel;
use crate::repositories::NewActivity;
use crate::server::AppState;

/// Request payload for appending an activity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPayload {
    #[schema(example = 1)]
    pub ticket_id: i32,
    /// Free-text category
    #[serde(rename = "type", default)]
    #[schema(example = "escalated")]
    pub activity_type: String,
    #[serde(default)]
    #[schema(example = "Escalated to network team")]
    pub message: String,
}

/// Activity as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub id: i32,
    pub ticket_id: i32,
    #[serde(rename = "type")]
    #[schema(example = "created")]
    pub activity_type: String,
    pub message: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
}

impl From<ActivityModel> for ActivityResponse {
    fn from(activity: ActivityModel) -> Self {
        Self {
            id: activity.id,
            ticket_id: activity.ticket_id,
            activity_type: activity.activity_type,
            message: activity.message,
            created_at: activity.created_at,
        }
    }
}

/// List the activity log of a ticket, oldest first
#[utoipa::path(
    get,
    path = "/api/tickets/{id}/activities",
    params(("id" = String, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Activities of the ticket", body = [ActivityResponse]),
        (status = 400, description = "Invalid ticket id", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "activities"
)]
pub async fn list_activities(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> Result<Json<Vec<ActivityResponse>>, ApiError> {
    let ticket_id = parse_id(&ticket_id, "ticket_id")?;

    let activities = state.activities.list_by_ticket(ticket_id).await?;

    Ok(Json(
        activities.into_iter().map(ActivityResponse::from).collect(),
    ))
}

/// Append an activity
#[utoipa::path(
    post,
    path = "/api/activities",
    request_body = ActivityPayload,
    responses(
        (status = 201, description = "Activity recorded", body = ActivityResponse),
        (status = 400, description = "Malformed request body", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "activities"
)]
pub async fn create_activity(
    State(state): State<AppState>,
    payload: Result<Json<ActivityPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<ActivityResponse>), ApiError> {
    let Json(payload) = payload?;

    let activity = state
        .activities
        .create(NewActivity {
            ticket_id: payload.ticket_id,
            activity_type: payload.activity_type,
            message: payload.message,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(activity.into())))
}
