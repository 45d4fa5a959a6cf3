//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM operations
//! for ticket-tracking entities. Every repository receives the shared connection pool
//! at construction time.

pub mod activity;
pub mod attachment;
pub mod comment;
pub mod ticket;

pub use activity::{ActivityRepository, NewActivity};
pub use attachment::AttachmentRepository;
pub use comment::{CommentRepository, NewComment};
pub use ticket::{ReplacedTicket, TicketFields, TicketRepository};
