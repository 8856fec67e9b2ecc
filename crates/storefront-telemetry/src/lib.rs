//! # Storefront Telemetry
//!
//! Logging and metrics for the storefront runtime.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry");
//!     // Logs now flow through tracing, counters are registered.
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SF_SERVICE_NAME` | `storefront` | Service name on log lines |
//! | `SF_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `SF_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `SF_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, BUS_EVENTS, PAYMENT_METHODS_CACHED,
    PURCHASES, PURCHASE_DURATION, WALLET_SESSIONS,
};
pub use tracing_setup::{init_logging, LoggingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Register metrics and install the log subscriber.
///
/// Returns a guard that should be held for the lifetime of the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    let logging = init_logging(&config)?;

    Ok(TelemetryGuard { logging })
}

/// Keeps telemetry active.
pub struct TelemetryGuard {
    logging: LoggingGuard,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.logging.service_name(), "Shutting down telemetry...");
    }
}

/// Increment a counter, optionally by label values.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
