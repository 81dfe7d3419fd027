//! Startup orchestration: connect, then mount and bind, then serve until a signal.
//!
//! Each step runs to completion before the next begins. A failure at any step
//! returns an error without binding the listener (or drops it if already
//! bound), so nothing is ever left listening after a failed start.

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use super::{Phase, Signal};
use crate::config::Config;
use crate::db::{Connector, DbHandle};
use crate::error::StartupError;
use crate::routes::{self, MountPoint};
use crate::server::{router, state::AppContext};

/// A fully started service: connected, mounted, and bound.
pub struct Running {
    pub context: AppContext,
    pub router: Router,
    pub listener: TcpListener,
    pub local_addr: SocketAddr,
}

/// Make the single database connection attempt and build the application context.
///
/// # Errors
///
/// Returns [`StartupError::Connection`] if the attempt fails.
pub async fn connect(config: Config, connector: &dyn Connector) -> Result<AppContext, StartupError> {
    let store = connector.connect(&config.database()).await?;
    let db = DbHandle::new(store);
    info!(phase = %Phase::DbConnected, host = %db.host(), "MongoDB connected");

    Ok(AppContext::new(config, db))
}

/// Mount every route group and bind the listener.
///
/// # Errors
///
/// - [`StartupError::RouteLoad`] if any collaborator fails to load.
/// - [`StartupError::Bind`] if the port cannot be bound.
///
/// The database connection is closed before either error is returned.
pub async fn launch(context: AppContext, mounts: &[MountPoint]) -> Result<Running, StartupError> {
    let api = match routes::mount_all(&context, mounts) {
        Ok(api) => api,
        Err(e) => {
            abandon(&context).await;
            return Err(e.into());
        }
    };
    let prefixes: Vec<&str> = mounts.iter().map(MountPoint::prefix).collect();
    info!(phase = %Phase::RoutesMounted, groups = ?prefixes, "routes mounted");

    let router = router::build(context.clone(), api);

    let addr = context.config.listen_addr();
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(source) => {
            abandon(&context).await;
            return Err(StartupError::Bind { addr, source });
        }
    };
    let local_addr = match listener.local_addr() {
        Ok(local_addr) => local_addr,
        Err(source) => {
            abandon(&context).await;
            return Err(StartupError::Bind { addr, source });
        }
    };
    info!(phase = %Phase::Listening, port = local_addr.port(), "CodeCon server running");

    Ok(Running {
        context,
        router,
        listener,
        local_addr,
    })
}

/// Serve requests until `shutdown` yields a signal.
///
/// The listener is dropped as soon as the signal arrives; in-flight requests
/// are not drained.
///
/// # Errors
///
/// Returns [`StartupError::Serve`] if the server stops before any signal.
pub async fn serve<F>(running: Running, shutdown: F) -> Result<Signal, StartupError>
where
    F: Future<Output = Signal>,
{
    let Running {
        router,
        listener,
        local_addr,
        ..
    } = running;
    debug!(address = %local_addr, "accepting connections");

    tokio::select! {
        res = axum::serve(listener, router).into_future() => {
            let err = res.err().unwrap_or_else(|| {
                std::io::Error::other("server exited without a shutdown signal")
            });
            Err(StartupError::Serve(err))
        }
        signal = shutdown => Ok(signal),
    }
}

/// Best-effort close, bounded by the shutdown timeout, when the service stops
/// without a signal after connecting.
pub(super) async fn abandon(context: &AppContext) {
    let timeout = context.config.shutdown_timeout;
    match tokio::time::timeout(timeout, context.db.close()).await {
        Ok(Ok(_)) => debug!("MongoDB connection closed after aborted startup"),
        Ok(Err(e)) => warn!(error = %e, "failed to close MongoDB connection after aborted startup"),
        Err(_) => warn!(?timeout, "timed out closing MongoDB connection after aborted startup"),
    }
}
