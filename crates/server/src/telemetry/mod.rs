//! Structured logging, with optional OpenTelemetry span export.
//!
//! Logs are JSON on stdout. When `OTEL_EXPORTER_OTLP_ENDPOINT` is set, spans
//! are also exported over OTLP/gRPC.
//!
//! # Telemetry invariants
//!
//! - The MongoDB connection string carries credentials and must never appear
//!   in any span attribute or log field; log the host only.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`), overridden
//!   by `RUST_LOG` when set.

pub mod init;

pub use init::{init_telemetry, shutdown_telemetry};
