//! Process-level error taxonomy.
//!
//! Every variant is terminal: the entry point logs it and exits with code 1.
//! Nothing here is retried.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;
use crate::db::DbError;
use crate::lifecycle::Phase;
use crate::routes::RouteLoadError;

/// Failures that abort startup, or stop a running server before a signal arrives.
#[derive(Debug, Error)]
pub enum StartupError {
    /// A required variable is missing or a value is invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The database is unreachable, rejected the credentials, or the URI is malformed.
    #[error("MongoDB connection error: {0}")]
    Connection(#[from] DbError),

    /// A route collaborator failed to load.
    #[error("error loading routes: {0}")]
    RouteLoad(#[from] RouteLoadError),

    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// OS signal handlers could not be registered.
    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] std::io::Error),

    /// The HTTP server stopped on its own.
    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl StartupError {
    /// The lifecycle phase the process was in when this error occurred.
    pub fn phase(&self) -> Phase {
        match self {
            StartupError::Configuration(_) | StartupError::Signals(_) => Phase::Starting,
            StartupError::Connection(_) => Phase::ConfigValidated,
            StartupError::RouteLoad(_) => Phase::DbConnected,
            StartupError::Bind { .. } => Phase::RoutesMounted,
            StartupError::Serve(_) => Phase::Listening,
        }
    }
}

/// Failures while closing resources after a termination signal.
#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("error closing MongoDB connection: {0}")]
    Close(#[from] DbError),

    #[error("timed out closing MongoDB connection after {0:?}")]
    Timeout(Duration),
}

/// Anything that ends the process with a non-zero exit code.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error(transparent)]
    Shutdown(#[from] ShutdownError),
}

impl LifecycleError {
    pub fn phase(&self) -> Phase {
        match self {
            LifecycleError::Startup(e) => e.phase(),
            LifecycleError::Shutdown(_) => Phase::ShuttingDown,
        }
    }
}
