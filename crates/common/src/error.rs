//! Common error types shared across crates.

use thiserror::Error;

/// Error surfaced to HTTP callers by the server and its route collaborators.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::NotImplemented`] → 501
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No route or resource matches the request.
    #[error("not found: {0}")]
    NotFound(String),

    /// The route group is mounted but its collaborator provides no handler.
    #[error("not implemented: {0}")]
    NotImplemented(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::NotFound(_) => 404,
            ServiceError::NotImplemented(_) => 501,
        }
    }

    /// Short machine-readable code used in [`crate::protocol::ErrorResponse`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "not_found",
            ServiceError::NotImplemented(_) => "not_implemented",
        }
    }

    /// Human-readable detail without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            ServiceError::NotFound(m) | ServiceError::NotImplemented(m) => m,
        }
    }
}
