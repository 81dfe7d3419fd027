//! Shared application context injected into every Axum handler and collaborator.

use std::sync::Arc;

use crate::config::Config;
use crate::db::DbHandle;

/// Application context built once in the entry point.
///
/// Route registration and shutdown receive it explicitly; nothing is held in
/// globals. All fields are cheaply cloneable so Axum can clone the context for
/// each request.
#[derive(Clone, Debug)]
pub struct AppContext {
    /// Validated service configuration.
    pub config: Arc<Config>,
    /// Process-wide database connection, closed once during shutdown.
    pub db: DbHandle,
}

impl AppContext {
    pub fn new(config: Config, db: DbHandle) -> Self {
        Self {
            config: Arc::new(config),
            db,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::db::MockDocumentStore;

    /// Context over a mock store that answers pings and closes cleanly.
    pub fn healthy_context() -> AppContext {
        let mut store = MockDocumentStore::new();
        store.expect_host().returning(|| "127.0.0.1:27017".into());
        store.expect_ping().returning(|| Ok(()));
        store.expect_close().returning(|| Ok(()));
        context_with(store)
    }

    pub fn context_with(store: MockDocumentStore) -> AppContext {
        AppContext::new(Config::for_tests(3000), DbHandle::new(Arc::new(store)))
    }
}
