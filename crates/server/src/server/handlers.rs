//! Axum request handlers owned by the service itself.
//!
//! Route-group handlers live behind [`crate::routes::Collaborator`]s.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{ErrorResponse, HealthResponse};
use common::ServiceError;
use tracing::warn;

use super::state::AppContext;

/// Static text returned by the liveness endpoint.
pub const LIVENESS_MESSAGE: &str = "🚀 CodeCon Backend is Live & Connected to MongoDB";

/// `GET /`: liveness check used by deployment and uptime probes.
pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

/// `GET /health`: readiness check.
///
/// Returns `200 OK` when the database answers a ping, `503 Service Unavailable`
/// when it does not or when shutdown has already closed the connection.
pub async fn health(State(ctx): State<AppContext>) -> Response {
    let database = if ctx.db.is_closed() {
        "closed"
    } else {
        match ctx.db.ping().await {
            Ok(()) => "connected",
            Err(e) => {
                warn!(error = %e, "readiness ping failed");
                "unreachable"
            }
        }
    };

    let (status_code, status_str) = if database == "connected" {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        database: database.into(),
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> Response {
    error_response(&ServiceError::NotFound(
        "the requested resource does not exist".into(),
    ))
}

/// Render a [`ServiceError`] as a JSON [`ErrorResponse`] with its status code.
pub fn error_response(err: &ServiceError) -> Response {
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err))).into_response()
}
