//! OS signal handling.
//!
//! Interrupt (SIGINT / Ctrl+C) and termination (SIGTERM) both trigger the same
//! shutdown. Handlers are installed before the listener binds so an early
//! signal is not lost, and once installed they replace the default
//! disposition: a repeated signal is delivered here instead of killing the
//! process.

use async_trait::async_trait;

/// Signals that trigger a graceful shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Terminate,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Interrupt => f.write_str("SIGINT"),
            Signal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Anything that yields shutdown signals.
#[async_trait]
pub trait SignalSource: Send {
    /// Wait for the next signal.
    ///
    /// Must be cancel safe: dropping the future before it completes loses no
    /// signal.
    async fn recv(&mut self) -> Signal;
}

/// Registered OS signal handlers.
pub struct Signals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl Signals {
    /// Register handlers for interrupt and termination.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot register a handler.
    #[cfg(unix)]
    pub fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {})
    }
}

#[async_trait]
impl SignalSource for Signals {
    #[cfg(unix)]
    async fn recv(&mut self) -> Signal {
        tokio::select! {
            _ = self.interrupt.recv() => Signal::Interrupt,
            _ = self.terminate.recv() => Signal::Terminate,
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) -> Signal {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl+C handler failed; waiting indefinitely");
            std::future::pending::<()>().await;
        }
        Signal::Interrupt
    }
}

/// In-process signal source, used to drive shutdown without real OS signals.
#[cfg(test)]
#[async_trait]
impl SignalSource for tokio::sync::mpsc::UnboundedReceiver<Signal> {
    async fn recv(&mut self) -> Signal {
        match tokio::sync::mpsc::UnboundedReceiver::recv(self).await {
            Some(signal) => signal,
            None => {
                tracing::warn!("signal channel closed; no further shutdown triggers");
                std::future::pending().await
            }
        }
    }
}
