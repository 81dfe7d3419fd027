//! `codecon-server`: backend binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (JSON logs, optional OTLP export).
//! 3. Install SIGINT / SIGTERM handlers.
//! 4. Connect to MongoDB (single attempt, verified with a ping).
//! 5. Mount every route group; abort if any collaborator fails to load.
//! 6. Bind `0.0.0.0:$PORT` and serve until a signal arrives.
//! 7. Close the MongoDB connection once and exit.
//!
//! Exit code is 0 after a clean signal-triggered shutdown and 1 on any failure.

mod config;
mod db;
mod error;
mod lifecycle;
mod routes;
mod server;
mod telemetry;

use std::process::ExitCode;

use tracing::{error, info, warn};

use crate::config::{Config, DEFAULT_PORT};
use crate::db::MongoConnector;
use crate::error::StartupError;
use crate::lifecycle::{Phase, Signals};

#[tokio::main]
async fn main() -> ExitCode {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Telemetry is not yet up; write to stderr directly.
            let e = StartupError::from(e);
            eprintln!("ERROR: configuration invalid in phase {}: {e}", e.phase());
            return ExitCode::FAILURE;
        }
    };

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    if let Err(e) = telemetry::init_telemetry(&cfg.log_level, cfg.otel_exporter_otlp_endpoint.as_deref()) {
        eprintln!("ERROR: telemetry initialisation failed: {e:#}");
        return ExitCode::FAILURE;
    }
    info!(
        version = env!("CARGO_PKG_VERSION"),
        phase = %Phase::ConfigValidated,
        port = cfg.port,
        "codecon-server starting"
    );
    if cfg.port_defaulted {
        warn!(port = DEFAULT_PORT, "PORT is not defined in environment variables; using default port");
    }

    // -----------------------------------------------------------------------
    // 3. Signals
    // -----------------------------------------------------------------------
    let signals = match Signals::install() {
        Ok(signals) => signals,
        Err(e) => {
            let e = StartupError::Signals(e);
            error!(phase = %e.phase(), error = %e, "startup failed");
            telemetry::shutdown_telemetry();
            return ExitCode::FAILURE;
        }
    };

    // -----------------------------------------------------------------------
    // 4-7. Connect, mount, serve, shut down
    // -----------------------------------------------------------------------
    let code = match lifecycle::run(cfg, &MongoConnector, &routes::default_mounts(), signals).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(phase = %e.phase(), error = %e, "fatal error; exiting");
            ExitCode::FAILURE
        }
    };

    telemetry::shutdown_telemetry();
    code
}
