//! # Tickets API Handlers
//!
//! This module contains handlers for ticket creation, retrieval, full
//! replacement and soft deletion. Every mutation appends to the ticket's
//! activity log on a best-effort basis.

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiError, not_found, parse_id};
use crate::models::activity::kind;
use crate::models::ticket::Model as TicketModel;
use crate::repositories::TicketFields;
use crate::server::AppState;

/// Request payload for creating or replacing a ticket.
///
/// Every field is optional; missing strings become empty. A body `id` is
/// ignored in favour of the path.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketPayload {
    /// Human-readable number; `TICKET-<id>` is assigned on create when empty.
    /// Other `TICKET-<digits>` values are reserved and rejected.
    #[schema(example = "OPS-1042")]
    pub ticket_number: Option<String>,
    #[schema(example = "Printer on fire")]
    pub title: String,
    pub description: String,
    #[schema(example = "open")]
    pub status: String,
    pub assignee: String,
    /// Due date (RFC 3339)
    #[schema(value_type = Option<String>, format = DateTime, example = "2024-06-01T17:00:00Z")]
    pub due_date: Option<DateTimeWithTimeZone>,
    #[schema(example = "high")]
    pub priority: String,
}

impl From<TicketPayload> for TicketFields {
    fn from(payload: TicketPayload) -> Self {
        Self {
            ticket_number: payload.ticket_number,
            title: payload.title,
            description: payload.description,
            status: payload.status,
            assignee: payload.assignee,
            due_date: payload.due_date,
            priority: payload.priority,
        }
    }
}

/// Ticket as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "TICKET-1")]
    pub ticket_number: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub assignee: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_date: Option<DateTimeWithTimeZone>,
    pub priority: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

impl From<TicketModel> for TicketResponse {
    fn from(ticket: TicketModel) -> Self {
        Self {
            id: ticket.id,
            ticket_number: ticket.ticket_number.unwrap_or_default(),
            title: ticket.title,
            description: ticket.description,
            status: ticket.status,
            assignee: ticket.assignee,
            due_date: ticket.due_date,
            priority: ticket.priority,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }
}

/// List all tickets
#[utoipa::path(
    get,
    path = "/api/tickets",
    responses(
        (status = 200, description = "Non-deleted tickets ordered by id", body = [TicketResponse]),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn list_tickets(
    State(state): State<AppState>,
) -> Result<Json<Vec<TicketResponse>>, ApiError> {
    let tickets = state.tickets.list().await?;

    Ok(Json(tickets.into_iter().map(TicketResponse::from).collect()))
}

/// Get a single ticket
#[utoipa::path(
    get,
    path = "/api/tickets/{id}",
    params(("id" = String, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Ticket found", body = TicketResponse),
        (status = 400, description = "Invalid ticket id", body = ApiError),
        (status = 404, description = "Ticket not found or deleted", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TicketResponse>, ApiError> {
    let id = parse_id(&id, "ticket_id")?;

    let ticket = state
        .tickets
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found("Ticket", id))?;

    Ok(Json(ticket.into()))
}

/// Create a ticket
#[utoipa::path(
    post,
    path = "/api/tickets",
    request_body = TicketPayload,
    responses(
        (status = 201, description = "Ticket created", body = TicketResponse),
        (status = 400, description = "Malformed request body or reserved ticket number", body = ApiError),
        (status = 409, description = "Ticket number already in use", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn create_ticket(
    State(state): State<AppState>,
    payload: Result<Json<TicketPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    let Json(payload) = payload?;

    let ticket = state.tickets.create(payload.into()).await?;
    tracing::info!(
        ticket_id = ticket.id,
        ticket_number = ticket.ticket_number.as_deref().unwrap_or_default(),
        "Ticket created"
    );

    state
        .activities
        .record_best_effort(
            ticket.id,
            kind::CREATED,
            format!("Ticket created: {}", ticket.title),
        )
        .await;

    Ok((StatusCode::CREATED, Json(ticket.into())))
}

/// Replace every mutable field of a ticket
#[utoipa::path(
    put,
    path = "/api/tickets/{id}",
    params(("id" = String, Path, description = "Ticket id")),
    request_body = TicketPayload,
    responses(
        (status = 200, description = "Ticket replaced", body = TicketResponse),
        (status = 400, description = "Invalid ticket id, malformed body or reserved ticket number", body = ApiError),
        (status = 404, description = "Ticket not found or deleted", body = ApiError),
        (status = 409, description = "Ticket number already in use", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn update_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TicketPayload>, JsonRejection>,
) -> Result<Json<TicketResponse>, ApiError> {
    let id = parse_id(&id, "ticket_id")?;
    let Json(payload) = payload?;

    let replaced = state.tickets.replace(id, payload.into()).await?;
    let ticket = &replaced.current;

    state
        .activities
        .record_best_effort(
            ticket.id,
            kind::UPDATED,
            format!("Ticket updated: {}", ticket.title),
        )
        .await;

    if replaced.status_changed() {
        state
            .activities
            .record_best_effort(
                ticket.id,
                kind::STATUS_CHANGED,
                format!(
                    "Status changed from {} to {}",
                    replaced.previous.status, ticket.status
                ),
            )
            .await;
    }

    Ok(Json(replaced.current.into()))
}

/// Soft-delete a ticket
#[utoipa::path(
    delete,
    path = "/api/tickets/{id}",
    params(("id" = String, Path, description = "Ticket id")),
    responses(
        (status = 204, description = "Ticket deleted (or already absent)"),
        (status = 400, description = "Invalid ticket id", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn delete_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "ticket_id")?;

    if state.tickets.soft_delete(id).await? {
        tracing::info!(ticket_id = id, "Ticket deleted");
    } else {
        tracing::debug!(ticket_id = id, "Delete matched no live ticket");
    }

    Ok(StatusCode::NO_CONTENT)
}
