//! # Comment Repository
//!
//! CRUD operations for ticket comments. Deleted comments keep their row and
//! disappear from every read path.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

use crate::error::RepositoryError;
use crate::models::comment::{
    self, ActiveModel as CommentActiveModel, Entity as Comment, Model as CommentModel,
};

/// Request data for creating a comment
#[derive(Debug, Clone)]
pub struct NewComment {
    pub ticket_id: i32,
    pub author: String,
    pub text: String,
}

/// Repository for Comment database operations
#[derive(Debug, Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a comment
    pub async fn create(&self, new_comment: NewComment) -> Result<CommentModel, RepositoryError> {
        let now: DateTimeWithTimeZone = Utc::now().into();

        CommentActiveModel {
            ticket_id: Set(new_comment.ticket_id),
            author: Set(new_comment.author),
            text: Set(new_comment.text),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    /// Comments of a ticket, oldest first
    pub async fn list_by_ticket(&self, ticket_id: i32) -> Result<Vec<CommentModel>, RepositoryError> {
        Comment::find()
            .filter(comment::Column::TicketId.eq(ticket_id))
            .filter(comment::Column::DeletedAt.is_null())
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&*self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<CommentModel>, RepositoryError> {
        Comment::find_by_id(id)
            .filter(comment::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Update author and text in place
    pub async fn update(
        &self,
        id: i32,
        author: String,
        text: String,
    ) -> Result<CommentModel, RepositoryError> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Comment not found".to_string()))?;

        let mut active = existing.into_active_model();
        active.author = Set(author);
        active.text = Set(text);
        active.updated_at = Set(Utc::now().into());

        active
            .update(&*self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Soft-delete a comment, returning whether a live row was marked
    pub async fn soft_delete(&self, id: i32) -> Result<bool, RepositoryError> {
        let now: DateTimeWithTimeZone = Utc::now().into();

        let result = Comment::update_many()
            .set(CommentActiveModel {
                deleted_at: Set(Some(now)),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(comment::Column::Id.eq(id))
            .filter(comment::Column::DeletedAt.is_null())
            .exec(&*self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result.rows_affected > 0)
    }
}
