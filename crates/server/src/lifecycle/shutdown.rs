//! One-shot shutdown: close the database, then let the process exit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::{Phase, Signal, SignalSource};
use crate::db::CloseOutcome;
use crate::error::ShutdownError;
use crate::server::state::AppContext;

/// What a call to [`Shutdown::run`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// This call closed the database.
    Completed,
    /// Another call already started shutdown; this trigger was ignored.
    AlreadyInProgress,
}

/// Guard that lets shutdown run at most once, however many signals arrive.
#[derive(Clone, Debug)]
pub struct Shutdown {
    started: Arc<AtomicBool>,
    timeout: Duration,
}

impl Shutdown {
    /// `timeout` bounds how long closing the database may take.
    pub fn new(timeout: Duration) -> Self {
        Self {
            started: Arc::new(AtomicBool::new(false)),
            timeout,
        }
    }

    /// Close the database connection for `signal`.
    ///
    /// Only the first call does any work; later calls return
    /// [`ShutdownOutcome::AlreadyInProgress`] immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::Close`] if the close fails and
    /// [`ShutdownError::Timeout`] if it does not finish within the timeout.
    pub async fn run(&self, ctx: &AppContext, signal: Signal) -> Result<ShutdownOutcome, ShutdownError> {
        if self.started.swap(true, Ordering::AcqRel) {
            warn!(%signal, "shutdown already in progress; ignoring signal");
            return Ok(ShutdownOutcome::AlreadyInProgress);
        }

        info!(phase = %Phase::ShuttingDown, %signal, "shutdown signal received");

        match tokio::time::timeout(self.timeout, ctx.db.close()).await {
            Ok(Ok(CloseOutcome::Closed)) => info!("MongoDB connection closed"),
            Ok(Ok(CloseOutcome::AlreadyClosed)) => info!("MongoDB connection was already closed"),
            Ok(Err(e)) => return Err(ShutdownError::Close(e)),
            Err(_) => return Err(ShutdownError::Timeout(self.timeout)),
        }
        Ok(ShutdownOutcome::Completed)
    }

    /// Run shutdown for `first`, while any further signals from `signals` are
    /// absorbed by the one-shot guard.
    pub async fn drive<S: SignalSource>(
        &self,
        ctx: &AppContext,
        first: Signal,
        signals: &mut S,
    ) -> Result<(), ShutdownError> {
        let close = self.run(ctx, first);
        tokio::pin!(close);

        loop {
            tokio::select! {
                biased;
                res = &mut close => return res.map(|_| ()),
                again = signals.recv() => {
                    self.run(ctx, again).await?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DbError, DocumentStore, MockDocumentStore};
    use crate::server::state::test_support::context_with;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    fn closing_store(result: fn() -> Result<(), DbError>) -> MockDocumentStore {
        let mut store = MockDocumentStore::new();
        store.expect_host().returning(|| "127.0.0.1:27017".into());
        store.expect_close().times(1).returning(move || result());
        store
    }

    #[tokio::test]
    async fn closes_database_exactly_once() {
        let ctx = context_with(closing_store(|| Ok(())));
        let shutdown = Shutdown::new(Duration::from_secs(1));

        let first = shutdown.run(&ctx, Signal::Interrupt).await.unwrap();
        let second = shutdown.run(&ctx, Signal::Terminate).await.unwrap();

        assert_eq!(first, ShutdownOutcome::Completed);
        assert_eq!(second, ShutdownOutcome::AlreadyInProgress);
        assert!(ctx.db.is_closed());
    }

    #[tokio::test]
    async fn close_failure_is_reported() {
        let ctx = context_with(closing_store(|| Err(DbError::Close("socket reset".into()))));
        let shutdown = Shutdown::new(Duration::from_secs(1));

        let err = shutdown.run(&ctx, Signal::Terminate).await.unwrap_err();
        assert!(matches!(err, ShutdownError::Close(_)));
    }

    /// Store whose close never completes.
    struct HangingStore;

    #[async_trait]
    impl DocumentStore for HangingStore {
        fn host(&self) -> String {
            "hanging:27017".into()
        }

        async fn ping(&self) -> Result<(), DbError> {
            Ok(())
        }

        async fn close(&self) -> Result<(), DbError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn hanging_close_times_out() {
        let ctx = AppContext::new(
            crate::config::Config::for_tests(3000),
            crate::db::DbHandle::new(Arc::new(HangingStore)),
        );
        let shutdown = Shutdown::new(Duration::from_millis(50));

        let err = shutdown.run(&ctx, Signal::Interrupt).await.unwrap_err();
        assert!(matches!(err, ShutdownError::Timeout(_)));
    }

    #[tokio::test]
    async fn duplicate_signal_during_shutdown_is_ignored() {
        let ctx = context_with(closing_store(|| Ok(())));
        let shutdown = Shutdown::new(Duration::from_secs(1));
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(Signal::Terminate).unwrap();

        shutdown.drive(&ctx, Signal::Interrupt, &mut rx).await.unwrap();
        assert!(ctx.db.is_closed());
    }
}
