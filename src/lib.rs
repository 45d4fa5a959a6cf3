//! # Ticket API Library
//!
//! This library provides the core functionality for the Ticket API service:
//! configuration, persistence, attachment storage, handlers and server setup.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod server;
pub mod storage;
pub mod telemetry;
pub use migration;
