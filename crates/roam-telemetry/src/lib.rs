//! # Roam Telemetry
//!
//! Structured logging for processes that host roamed properties.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roam_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // Owners, the registry and the propagator now log through `tracing`
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ROAM_SERVICE_NAME` | `roam-sync` | Service name in the startup log |
//! | `ROAM_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `ROAM_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `ROAM_JSON_LOGS` | `false` | JSON lines instead of pretty output |

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install subscriber: {0}")]
    SubscriberInit(String),
}

/// Install the global subscriber described by `config`.
///
/// Returns a guard to hold for the lifetime of the process. Fails if a global
/// subscriber is already installed.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    init_tracing(&config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Keeps telemetry active. Logs shutdown on drop.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry...");
    }
}
