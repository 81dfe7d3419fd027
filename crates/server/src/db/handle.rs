//! [`DbHandle`]: shared, close-once wrapper around the connected store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{DbError, DocumentStore};

/// Result of a [`DbHandle::close`] call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// This call closed the underlying store.
    Closed,
    /// The store had already been closed by an earlier call; nothing was done.
    AlreadyClosed,
}

/// Cheaply cloneable handle to the process-wide database connection.
///
/// The store is written once at startup and never reassigned. The `closed`
/// flag guarantees the underlying [`DocumentStore::close`] runs at most once,
/// no matter how many clones call [`DbHandle::close`].
#[derive(Clone)]
pub struct DbHandle {
    store: Arc<dyn DocumentStore>,
    closed: Arc<AtomicBool>,
}

impl DbHandle {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Host the store is connected to.
    pub fn host(&self) -> String {
        self.store.host()
    }

    /// Returns `true` once [`DbHandle::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Ping the server. Fails without touching the network once closed.
    pub async fn ping(&self) -> Result<(), DbError> {
        if self.is_closed() {
            return Err(DbError::Unreachable("connection closed".into()));
        }
        self.store.ping().await
    }

    /// Close the connection exactly once.
    ///
    /// # Errors
    ///
    /// Returns the store's error if this call performed the close and it failed.
    /// The handle stays closed either way.
    pub async fn close(&self) -> Result<CloseOutcome, DbError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(CloseOutcome::AlreadyClosed);
        }
        self.store.close().await?;
        Ok(CloseOutcome::Closed)
    }
}

impl std::fmt::Debug for DbHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbHandle")
            .field("host", &self.store.host())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockDocumentStore;

    #[tokio::test]
    async fn close_runs_exactly_once_across_clones() {
        let mut store = MockDocumentStore::new();
        store.expect_close().times(1).returning(|| Ok(()));
        let handle = DbHandle::new(Arc::new(store));
        let other = handle.clone();

        assert_eq!(handle.close().await.unwrap(), CloseOutcome::Closed);
        assert_eq!(other.close().await.unwrap(), CloseOutcome::AlreadyClosed);
        assert!(other.is_closed());
    }

    #[tokio::test]
    async fn failed_close_still_marks_closed() {
        let mut store = MockDocumentStore::new();
        store
            .expect_close()
            .times(1)
            .returning(|| Err(DbError::Close("socket reset".into())));
        let handle = DbHandle::new(Arc::new(store));

        assert!(handle.close().await.is_err());
        assert!(handle.is_closed());
        assert_eq!(handle.close().await.unwrap(), CloseOutcome::AlreadyClosed);
    }

    #[tokio::test]
    async fn ping_after_close_does_not_reach_store() {
        let mut store = MockDocumentStore::new();
        store.expect_close().returning(|| Ok(()));
        store.expect_ping().never();
        let handle = DbHandle::new(Arc::new(store));

        handle.close().await.unwrap();
        assert!(matches!(handle.ping().await, Err(DbError::Unreachable(_))));
    }
}
