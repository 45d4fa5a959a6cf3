//! # Ticket Repository
//!
//! This module contains the repository implementation for Ticket entities.
//! Every read path hides soft-deleted rows.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::error::RepositoryError;
use crate::models::ticket::{
    self, ActiveModel as TicketActiveModel, Entity as Ticket, Model as TicketModel,
    generated_ticket_number, is_generated_ticket_number,
};

/// Client-controlled ticket fields, used for both creation and full replacement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFields {
    /// Ticket number; `None` or `""` means "assign one" on create and "clear" on replace
    pub ticket_number: Option<String>,
    pub title: String,
    pub description: String,
    pub status: String,
    pub assignee: String,
    pub due_date: Option<DateTimeWithTimeZone>,
    pub priority: String,
}

impl TicketFields {
    /// Supplied number, stored verbatim; only an empty string counts as absent.
    fn supplied_ticket_number(&self) -> Option<String> {
        self.ticket_number
            .clone()
            .filter(|number| !number.is_empty())
    }
}

/// Rejects a supplied number in the generated namespace unless it is the row's own.
fn check_reserved_number(number: Option<&str>, id: i32) -> Result<(), RepositoryError> {
    match number {
        Some(number)
            if is_generated_ticket_number(number) && number != generated_ticket_number(id) =>
        {
            Err(RepositoryError::validation_error(format!(
                "Ticket number '{}' is reserved for generated numbers",
                number
            )))
        }
        _ => Ok(()),
    }
}

/// Result of a full replacement: the row as it was and as it is now
#[derive(Debug, Clone)]
pub struct ReplacedTicket {
    pub previous: TicketModel,
    pub current: TicketModel,
}

impl ReplacedTicket {
    /// Whether the replacement changed the ticket status.
    pub fn status_changed(&self) -> bool {
        self.previous.status != self.current.status
    }
}

/// Repository for Ticket database operations
#[derive(Debug, Clone)]
pub struct TicketRepository {
    db: Arc<DatabaseConnection>,
}

impl TicketRepository {
    /// Create a new TicketRepository with the given database connection
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new ticket.
    ///
    /// When no ticket number is supplied the row is inserted first to obtain
    /// its id, then `TICKET-<id>` is written back. Both writes share one
    /// transaction, so a ticket is never visible without a number.
    ///
    /// Supplied numbers of the form `TICKET-<digits>` are refused unless they
    /// match the new row's id, so a backfill can never collide with them.
    pub async fn create(&self, fields: TicketFields) -> Result<TicketModel, RepositoryError> {
        let now = Utc::now();
        let ticket_number = fields.supplied_ticket_number();

        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let inserted = TicketActiveModel {
            ticket_number: Set(ticket_number),
            title: Set(fields.title),
            description: Set(fields.description),
            status: Set(fields.status),
            assignee: Set(fields.assignee),
            due_date: Set(fields.due_date),
            priority: Set(fields.priority),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(RepositoryError::database_error)?;

        check_reserved_number(inserted.ticket_number.as_deref(), inserted.id)?;

        let ticket = if inserted.ticket_number.is_some() {
            inserted
        } else {
            let number = generated_ticket_number(inserted.id);
            let mut active = inserted.into_active_model();
            active.ticket_number = Set(Some(number));
            active
                .update(&txn)
                .await
                .map_err(RepositoryError::database_error)?
        };

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(ticket)
    }

    /// List all non-deleted tickets ordered by id
    pub async fn list(&self) -> Result<Vec<TicketModel>, RepositoryError> {
        Ticket::find()
            .filter(ticket::Column::DeletedAt.is_null())
            .order_by_asc(ticket::Column::Id)
            .all(&*self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Get a non-deleted ticket by id
    pub async fn find_by_id(&self, id: i32) -> Result<Option<TicketModel>, RepositoryError> {
        Ticket::find_by_id(id)
            .filter(ticket::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Overwrite every client-controlled field of a ticket.
    ///
    /// Fields missing from `fields` are cleared, including the ticket number.
    /// `created_at` is kept and `updated_at` refreshed.
    pub async fn replace(
        &self,
        id: i32,
        fields: TicketFields,
    ) -> Result<ReplacedTicket, RepositoryError> {
        let ticket_number = fields.supplied_ticket_number();
        check_reserved_number(ticket_number.as_deref(), id)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let previous = Ticket::find_by_id(id)
            .filter(ticket::Column::DeletedAt.is_null())
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("Ticket not found".to_string()))?;

        let mut active = previous.clone().into_active_model();
        active.ticket_number = Set(ticket_number);
        active.title = Set(fields.title);
        active.description = Set(fields.description);
        active.status = Set(fields.status);
        active.assignee = Set(fields.assignee);
        active.due_date = Set(fields.due_date);
        active.priority = Set(fields.priority);
        active.updated_at = Set(Utc::now().into());

        let current = active
            .update(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(ReplacedTicket { previous, current })
    }

    /// Soft-delete a ticket, returning whether a live row was marked
    pub async fn soft_delete(&self, id: i32) -> Result<bool, RepositoryError> {
        let now: DateTimeWithTimeZone = Utc::now().into();

        let result = Ticket::update_many()
            .set(TicketActiveModel {
                deleted_at: Set(Some(now)),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(ticket::Column::Id.eq(id))
            .filter(ticket::Column::DeletedAt.is_null())
            .exec(&*self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result.rows_affected > 0)
    }
}
