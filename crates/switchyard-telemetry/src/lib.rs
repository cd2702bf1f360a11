//! Observability for Switchyard.
//!
//! - **Logging**: structured JSON or pretty output via `tracing-subscriber`
//! - **Metrics**: dispatch counters and latency via the `metrics` facade
//!
//! # Example
//!
//! ```rust,no_run
//! use switchyard_config::SwitchyardConfig;
//!
//! let config = SwitchyardConfig::production();
//! switchyard_telemetry::init_telemetry(&config).expect("telemetry");
//! ```

#![doc(html_root_url = "https://docs.rs/switchyard-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::init_logging;
pub use metrics::{record_dispatch, Outcome};

use switchyard_config::SwitchyardConfig;

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Installs logging and describes the dispatch metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if logging cannot be installed.
pub fn init_telemetry(config: &SwitchyardConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    metrics::describe_metrics();
    Ok(())
}
