//! Database migrations for the Ticket API.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_01_01_000001_create_tickets;
mod m2025_01_01_000002_create_comments;
mod m2025_01_01_000003_create_activities;
mod m2025_01_01_000004_create_attachments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_01_01_000001_create_tickets::Migration),
            Box::new(m2025_01_01_000002_create_comments::Migration),
            Box::new(m2025_01_01_000003_create_activities::Migration),
            Box::new(m2025_01_01_000004_create_attachments::Migration),
        ]
    }
}
