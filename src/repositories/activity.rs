//! # Activity Repository
//!
//! Append-only access to the per-ticket activity log. Activities are never
//! updated or deleted, so this repository exposes no such operations.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::error::RepositoryError;
use crate::models::activity::{
    self, ActiveModel as ActivityActiveModel, Entity as Activity, Model as ActivityModel,
};

/// Request data for appending an activity
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub ticket_id: i32,
    /// Free-text category; not restricted to the kinds the service writes itself
    pub activity_type: String,
    pub message: String,
}

/// Repository for Activity database operations
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    db: Arc<DatabaseConnection>,
}

impl ActivityRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append an activity; `created_at` is always assigned here
    pub async fn create(&self, new_activity: NewActivity) -> Result<ActivityModel, RepositoryError> {
        ActivityActiveModel {
            ticket_id: Set(new_activity.ticket_id),
            activity_type: Set(new_activity.activity_type),
            message: Set(new_activity.message),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    /// Append an activity as a side effect of another operation.
    ///
    /// Failures are logged at `warn` and reported as `None`; they never
    /// propagate to the operation that triggered the entry.
    pub async fn record_best_effort(
        &self,
        ticket_id: i32,
        activity_type: &str,
        message: impl Into<String>,
    ) -> Option<ActivityModel> {
        let new_activity = NewActivity {
            ticket_id,
            activity_type: activity_type.to_string(),
            message: message.into(),
        };

        match self.create(new_activity).await {
            Ok(model) => Some(model),
            Err(error) => {
                tracing::warn!(
                    ticket_id,
                    activity_type,
                    %error,
                    "Failed to record activity; continuing without it"
                );
                None
            }
        }
    }

    /// Activities of a ticket, oldest first
    pub async fn list_by_ticket(&self, ticket_id: i32) -> Result<Vec<ActivityModel>, RepositoryError> {
        Activity::find()
            .filter(activity::Column::TicketId.eq(ticket_id))
            .order_by_asc(activity::Column::CreatedAt)
            .order_by_asc(activity::Column::Id)
            .all(&*self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
