//! # Attachment Repository
//!
//! Catalog rows for uploaded files. The repository owns both halves of an
//! attachment: storing writes the file before the row, deleting removes the
//! file before the row delete commits.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use scopeguard::ScopeGuard;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::error::RepositoryError;
use crate::models::attachment::{
    self, ActiveModel as AttachmentActiveModel, Entity as Attachment, Model as AttachmentModel,
};
use crate::storage::AttachmentStorage;

/// Repository for Attachment database and file operations
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    db: Arc<DatabaseConnection>,
    storage: AttachmentStorage,
}

impl AttachmentRepository {
    pub fn new(db: Arc<DatabaseConnection>, storage: AttachmentStorage) -> Self {
        Self { db, storage }
    }

    pub fn storage(&self) -> &AttachmentStorage {
        &self.storage
    }

    /// Store an uploaded file and catalog it.
    ///
    /// The file is written first; if the row insert fails the file is removed
    /// again so no orphan is left in the upload directory.
    pub async fn store(
        &self,
        ticket_id: i32,
        raw_filename: &str,
        data: &[u8],
    ) -> Result<AttachmentModel, RepositoryError> {
        let filename = AttachmentStorage::sanitize_filename(raw_filename)?;
        let uploaded_at = Utc::now();

        let path = self.storage.save(&filename, data, uploaded_at).await?;
        // Fires only if this future is dropped before the insert settles.
        let cleanup = scopeguard::guard(path, |path: PathBuf| {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move { remove_orphan(&path).await });
                }
                Err(_) => {
                    if let Err(error) = std::fs::remove_file(&path) {
                        tracing::warn!(path = %path.display(), %error, "Failed to remove orphaned attachment file");
                    }
                }
            }
        });

        let inserted = AttachmentActiveModel {
            ticket_id: Set(ticket_id),
            filename: Set(filename),
            filepath: Set(cleanup.to_string_lossy().into_owned()),
            uploaded_at: Set(uploaded_at.into()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await;

        let path = ScopeGuard::into_inner(cleanup);
        let attachment = match inserted {
            Ok(attachment) => attachment,
            Err(error) => {
                remove_orphan(&path).await;
                return Err(RepositoryError::database_error(error));
            }
        };

        tracing::info!(
            attachment_id = attachment.id,
            ticket_id,
            path = %path.display(),
            "Attachment stored"
        );

        Ok(attachment)
    }

    /// Attachments of a ticket, oldest upload first
    pub async fn list_by_ticket(
        &self,
        ticket_id: i32,
    ) -> Result<Vec<AttachmentModel>, RepositoryError> {
        Attachment::find()
            .filter(attachment::Column::TicketId.eq(ticket_id))
            .order_by_asc(attachment::Column::UploadedAt)
            .order_by_asc(attachment::Column::Id)
            .all(&*self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<AttachmentModel>, RepositoryError> {
        Attachment::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Delete an attachment row together with its stored file.
    ///
    /// The row delete commits only after the file is gone; a file that is
    /// already missing counts as removed. Any other removal error rolls the
    /// row delete back. Returns `false` when no such attachment exists.
    pub async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let Some(existing) = Attachment::find_by_id(id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
        else {
            return Ok(false);
        };

        Attachment::delete_by_id(existing.id)
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        // Dropping `txn` on error rolls the delete back.
        self.storage.remove(Path::new(&existing.filepath)).await?;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(attachment_id = id, ticket_id = existing.ticket_id, "Attachment deleted");
        Ok(true)
    }
}

async fn remove_orphan(path: &Path) {
    if let Err(error) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), %error, "Failed to remove orphaned attachment file");
    }
}
