//! The seam between the service and its route-group handlers.

use axum::{response::Response, routing::any, Router};
use common::ServiceError;

use crate::server::{handlers::error_response, state::AppContext};

/// An external router unit mounted at a path prefix.
///
/// `load` runs once during startup. Returning an error aborts startup before
/// the listener is bound. The router sees paths relative to its prefix, so
/// `/api/auth`, `/api/auth/` and `/api/auth/login` arrive as `/`, `/` and
/// `/login`.
pub trait Collaborator: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Build the router served under this collaborator's prefix.
    fn load(&self, ctx: &AppContext) -> anyhow::Result<Router<AppContext>>;
}

/// Placeholder for a route group whose handlers are not part of this service.
///
/// Every method and path under the prefix answers `501 Not Implemented`, so the
/// mount is observable without inventing any behaviour for the group.
#[derive(Debug, Clone, Copy)]
pub struct Unimplemented {
    group: &'static str,
}

impl Unimplemented {
    pub fn new(group: &'static str) -> Self {
        Self { group }
    }
}

impl Collaborator for Unimplemented {
    fn name(&self) -> &str {
        self.group
    }

    fn load(&self, _ctx: &AppContext) -> anyhow::Result<Router<AppContext>> {
        let group = self.group;
        let handler = move || async move { not_implemented(group) };
        Ok(Router::new()
            .route("/", any(handler))
            .route("/*rest", any(handler)))
    }
}

fn not_implemented(group: &str) -> Response {
    error_response(&ServiceError::NotImplemented(format!(
        "{group} routes are not available"
    )))
}
