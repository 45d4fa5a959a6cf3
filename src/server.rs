//! # Server Configuration
//!
//! This module contains the server setup and configuration for the Ticket API.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::handlers::{self, activities, attachments, comments, tickets};
use crate::repositories::{
    ActivityRepository, AttachmentRepository, CommentRepository, TicketRepository,
};
use crate::storage::AttachmentStorage;
use crate::telemetry;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<DatabaseConnection>,
    pub tickets: TicketRepository,
    pub comments: CommentRepository,
    pub activities: ActivityRepository,
    pub attachments: AttachmentRepository,
}

impl AppState {
    /// Wire every repository to the shared connection pool.
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Self {
        let db = Arc::new(db);
        let storage = AttachmentStorage::new(config.upload_dir.clone());

        Self {
            tickets: TicketRepository::new(db.clone()),
            comments: CommentRepository::new(db.clone()),
            activities: ActivityRepository::new(db.clone()),
            attachments: AttachmentRepository::new(db.clone(), storage),
            config: Arc::new(config),
            db,
        }
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    let api = Router::new()
        .route(
            "/api/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/api/tickets/{id}",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route(
            "/api/tickets/{id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/api/tickets/{id}/activities",
            get(activities::list_activities),
        )
        .route("/api/activities", post(activities::create_activity))
        .route(
            "/api/tickets/{id}/attachments",
            get(attachments::list_attachments).post(attachments::upload_attachment),
        )
        .route(
            "/api/attachments/{attachment_id}",
            delete(attachments::delete_attachment),
        );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/readyz", get(handlers::readyz))
        .merge(api)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(telemetry::propagate_trace_id))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .with_context(|| format!("Invalid server address '{}'", config.api_bind_addr))?;

    let state = AppState::new(config, db);
    state
        .attachments
        .storage()
        .init()
        .await
        .context("Failed to create upload directory")?;

    let profile = state.config.profile.clone();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, %profile, "Ticket API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")?;

    tracing::info!("Ticket API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Test state backed by a migrated in-memory database
#[cfg(test)]
pub(crate) async fn test_app_state(upload_dir: &std::path::Path) -> AppState {
    let config = AppConfig {
        profile: "test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        upload_dir: upload_dir.to_path_buf(),
        ..Default::default()
    };

    let db = crate::db::init_pool(&config)
        .await
        .expect("Failed to init test DB");
    crate::db::run_migrations(&db)
        .await
        .expect("Failed to migrate test DB");

    AppState::new(config, db)
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::readyz,
        crate::handlers::tickets::list_tickets,
        crate::handlers::tickets::get_ticket,
        crate::handlers::tickets::create_ticket,
        crate::handlers::tickets::update_ticket,
        crate::handlers::tickets::delete_ticket,
        crate::handlers::comments::list_comments,
        crate::handlers::comments::create_comment,
        crate::handlers::activities::list_activities,
        crate::handlers::activities::create_activity,
        crate::handlers::attachments::upload_attachment,
        crate::handlers::attachments::list_attachments,
        crate::handlers::attachments::delete_attachment,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::ReadinessStatus,
            crate::error::ApiError,
            crate::handlers::tickets::TicketPayload,
            crate::handlers::tickets::TicketResponse,
            crate::handlers::comments::CommentPayload,
            crate::handlers::comments::CommentResponse,
            crate::handlers::activities::ActivityPayload,
            crate::handlers::activities::ActivityResponse,
            crate::handlers::attachments::AttachmentUpload,
            crate::handlers::attachments::AttachmentResponse,
        )
    ),
    tags(
        (name = "root", description = "Service information and readiness"),
        (name = "tickets", description = "Ticket lifecycle"),
        (name = "comments", description = "Ticket comments"),
        (name = "activities", description = "Ticket activity log"),
        (name = "attachments", description = "Files attached to tickets"),
    ),
    info(
        title = "Ticket API",
        description = "CRUD API for support tickets, their comments, activity log and attachments",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
