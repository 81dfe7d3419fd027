//! Process lifecycle: ordered startup, signal handling, one-shot shutdown.
//!
//! # Phases
//! ```text
//! STARTING → CONFIG_VALIDATED → DB_CONNECTED → ROUTES_MOUNTED → LISTENING
//!     → SHUTTING_DOWN → TERMINATED
//! ```
//!
//! A failure before `LISTENING` goes straight to `TERMINATED` with exit code 1.
//! Only an OS signal moves `LISTENING` to `SHUTTING_DOWN`. A signal that arrives
//! while the database is still connecting abandons startup; one that arrives
//! once it is connected closes it before any route is mounted or port bound.

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::{Signal, SignalSource, Signals};

use tracing::info;

use crate::config::Config;
use crate::db::Connector;
use crate::error::LifecycleError;
use crate::routes::MountPoint;

/// Lifecycle phase, logged as the `phase` field on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    ConfigValidated,
    DbConnected,
    RoutesMounted,
    Listening,
    ShuttingDown,
    Terminated,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Starting => "STARTING",
            Phase::ConfigValidated => "CONFIG_VALIDATED",
            Phase::DbConnected => "DB_CONNECTED",
            Phase::RoutesMounted => "ROUTES_MOUNTED",
            Phase::Listening => "LISTENING",
            Phase::ShuttingDown => "SHUTTING_DOWN",
            Phase::Terminated => "TERMINATED",
        };
        f.write_str(name)
    }
}

/// Start the service and run it until a signal has been handled.
///
/// Returns `Ok(())` once a signal-triggered shutdown has completed: the
/// database was closed, or the signal arrived before it was connected.
///
/// # Errors
///
/// Returns [`LifecycleError::Startup`] if startup fails or the server stops on
/// its own, and [`LifecycleError::Shutdown`] if closing the database fails.
pub async fn run<S: SignalSource>(
    config: Config,
    connector: &dyn Connector,
    mounts: &[MountPoint],
    mut signals: S,
) -> Result<(), LifecycleError> {
    let shutdown = Shutdown::new(config.shutdown_timeout);

    let context = tokio::select! {
        biased;
        signal = signals.recv() => {
            info!(phase = %Phase::Terminated, %signal, "signal received before MongoDB connected; nothing to close");
            return Ok(());
        }
        res = startup::connect(config, connector) => res?,
    };

    if let Some(signal) = pending(&mut signals).await {
        shutdown.drive(&context, signal, &mut signals).await?;
        info!(phase = %Phase::Terminated, "shutdown complete");
        return Ok(());
    }

    let running = startup::launch(context, mounts).await?;
    let context = running.context.clone();

    let signal = match startup::serve(running, signals.recv()).await {
        Ok(signal) => signal,
        Err(e) => {
            startup::abandon(&context).await;
            return Err(e.into());
        }
    };

    shutdown.drive(&context, signal, &mut signals).await?;
    info!(phase = %Phase::Terminated, "shutdown complete");
    Ok(())
}

/// A signal that has already arrived, without waiting for one.
async fn pending<S: SignalSource>(signals: &mut S) -> Option<Signal> {
    tokio::select! {
        biased;
        signal = signals.recv() => Some(signal),
        () = std::future::ready(()) => None,
    }
}
