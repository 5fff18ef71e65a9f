//! Devshelf - a personal shelf of developer odds and ends.
//!
//! This library provides the core functionality for the `devshelf` CLI tool:
//! the document store for key-values, projects, commands, notes and websites,
//! the REST server in front of it, and the client that lists, searches, sorts
//! and summarizes those collections.

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod server;
pub mod storage;

use models::EntityKind;

/// Test utilities shared by unit tests.
#[cfg(test)]
pub(crate) mod test_utils {
    use std::sync::Arc;

    use crate::server::AppState;
    use crate::storage::{Connector, DatabaseUrl, Storage};

    /// Fresh in-memory storage.
    pub fn memory_storage() -> Storage {
        Storage::open(&DatabaseUrl::Memory).unwrap()
    }

    /// Connector over a private in-memory database (not the process-wide one).
    pub fn memory_connector() -> Arc<Connector> {
        Arc::new(Connector::new(DatabaseUrl::Memory))
    }

    /// Application state backed by a private in-memory database.
    pub fn memory_state() -> AppState {
        AppState::new(memory_connector())
    }
}

/// Library-level error type for devshelf operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to connect to the document store: {0}")]
    Connect(String),

    #[error("{} not found", .0.display_name())]
    NotFound(EntityKind),

    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{}", .0.duplicate_message())]
    Duplicate(EntityKind),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error reported by a devshelf server.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for devshelf operations.
pub type Result<T> = std::result::Result<T, Error>;
