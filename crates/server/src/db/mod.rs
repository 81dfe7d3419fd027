//! Document database access: connection, liveness probing, and close-once handle.
//!
//! # Lifecycle
//!
//! 1. At startup a [`Connector`] makes a single connection attempt and proves it
//!    with a `ping`. There is no retry: failure aborts startup.
//! 2. The resulting [`DocumentStore`] is wrapped in a [`DbHandle`] and shared
//!    through the application context for the lifetime of the process.
//! 3. During shutdown [`DbHandle::close`] closes the store exactly once; the
//!    handle is never reopened.

pub mod handle;
pub mod mongo;

pub use handle::{CloseOutcome, DbHandle};
pub use mongo::MongoConnector;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::DatabaseSettings;

/// Errors produced by the database layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// The connection string could not be parsed or the client rejected it.
    #[error("invalid database URI: {0}")]
    InvalidUri(String),

    /// The server could not be reached or refused the handshake.
    #[error("database unreachable: {0}")]
    Unreachable(String),

    /// The connection could not be closed cleanly.
    #[error("failed to close database connection: {0}")]
    Close(String),
}

/// A connected document database.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Host (and port) of the server the store is connected to, for logging.
    fn host(&self) -> String;

    /// Round-trip a `ping` to the server.
    async fn ping(&self) -> Result<(), DbError>;

    /// Release all connections held by the store.
    async fn close(&self) -> Result<(), DbError>;
}

/// Factory that performs the single startup connection attempt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to the database described by `settings` and verify it answers.
    async fn connect(&self, settings: &DatabaseSettings) -> Result<Arc<dyn DocumentStore>, DbError>;
}
