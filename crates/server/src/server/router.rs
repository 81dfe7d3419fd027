//! Axum router construction.

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::{handlers, middleware, state::AppContext};

/// Build the application [`Router`] around the mounted route groups.
///
/// `api` is the output of [`crate::routes::mount_all`]; the service's own
/// endpoints, the 404 fallback, and all middleware are added here.
pub fn build(ctx: AppContext, api: Router<AppContext>) -> Router {
    let request_timeout = ctx.config.request_timeout;

    Router::new()
        .route("/", get(handlers::liveness))
        .route("/health", get(handlers::health))
        .merge(api)
        .fallback(handlers::not_found)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http().make_span_with(middleware::make_request_span))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuidV4))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
