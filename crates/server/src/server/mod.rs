//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router: liveness, readiness, mounted route groups, 404 fallback.
//! - Apply shared middleware (tracing, request id, timeout, CORS, compression).
//! - Inject the shared application context (`AppContext`) into handlers.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
