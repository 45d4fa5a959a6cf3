//! Ticket entity model
//!
//! This module contains the SeaORM entity model for the tickets table.
//! Rows are soft-deleted: `deleted_at` is set and the row stays in place.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Support ticket
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    /// Auto-incremented identifier (primary key)
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Human-readable number, `TICKET-<id>` unless supplied by the client
    #[sea_orm(unique)]
    pub ticket_number: Option<String>,

    pub title: String,

    pub description: String,

    /// Free-text workflow status
    pub status: String,

    pub assignee: String,

    pub due_date: Option<DateTimeWithTimeZone>,

    pub priority: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    /// Soft-delete marker
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::activity::Entity")]
    Activity,
    #[sea_orm(has_many = "super::attachment::Entity")]
    Attachment,
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activity.def()
    }
}

impl Related<super::attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Ticket number assigned to tickets created without one.
pub fn generated_ticket_number(id: i32) -> String {
    format!("TICKET-{}", id)
}

/// Whether `number` lies in the `TICKET-<digits>` namespace reserved for generated numbers.
pub fn is_generated_ticket_number(number: &str) -> bool {
    number
        .strip_prefix("TICKET-")
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ticket_number_format() {
        assert_eq!(generated_ticket_number(1), "TICKET-1");
        assert_eq!(generated_ticket_number(4312), "TICKET-4312");
    }

    #[test]
    fn test_reserved_number_namespace() {
        assert!(is_generated_ticket_number("TICKET-2"));
        assert!(is_generated_ticket_number(&generated_ticket_number(981)));

        for number in ["TICKET-", "TICKET-2a", "ticket-2", " TICKET-2", "TICKET-2 ", "OPS-1", ""] {
            assert!(!is_generated_ticket_number(number), "{number:?}");
        }
    }
}
