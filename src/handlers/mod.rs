//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the Ticket API.

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorType};
use crate::models::ServiceInfo;
use crate::server::AppState;

pub mod activities;
pub mod attachments;
pub mod comments;
pub mod tickets;

/// Readiness check payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReadinessStatus {
    #[schema(example = "ready")]
    pub status: String,
}

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Readiness check: succeeds once the database answers `SELECT 1`
#[utoipa::path(
    get,
    path = "/readyz",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessStatus),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "root"
)]
pub async fn readyz(State(state): State<AppState>) -> Result<Json<ReadinessStatus>, ApiError> {
    crate::db::health_check(&state.db).await.map_err(|error| {
        tracing::warn!(error = %error, "Readiness check failed");
        ApiError::from(ErrorType::ServiceUnavailable)
            .with_details(json!({ "database": error.to_string() }))
    })?;

    Ok(Json(ReadinessStatus {
        status: "ready".to_string(),
    }))
}
