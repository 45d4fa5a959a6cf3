//! # Data Models
//!
//! SeaORM entities for tickets and the records attached to them, plus the
//! service information payload served at the root path.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod activity;
pub mod attachment;
pub mod comment;
pub mod ticket;

pub use activity::Entity as Activity;
pub use attachment::Entity as Attachment;
pub use comment::Entity as Comment;
pub use ticket::Entity as Ticket;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
    /// Liveness message
    pub message: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "tickets".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            message: "Ticket API is running".to_string(),
        }
    }
}
