//! Structured logging setup.
//!
//! Installs a global `tracing-subscriber` registry with an [`EnvFilter`] and
//! either JSON or pretty output, selected by [`LogConfig`].
//!
//! # Example
//!
//! ```rust,no_run
//! use switchyard_config::SwitchyardConfig;
//! use switchyard_telemetry::logging::init_logging;
//!
//! let config = SwitchyardConfig::development();
//! init_logging(&config.logging).unwrap();
//!
//! tracing::info!(route = "/users/{id}", "route registered");
//! ```

use switchyard_config::{LogConfig, LogFormat};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Installs the global subscriber described by `config`.
///
/// Does nothing when logging is disabled.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] for a bad `level` directive and
/// [`TelemetryError::LoggingInit`] if a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    let layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_ansi(config.ansi_enabled)
            .with_target(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_ansi(config.ansi_enabled)
            .with_target(true)
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Parses a filter directive such as `info` or `switchyard_router=debug,warn`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] if the directive is invalid.
pub fn create_env_filter(directive: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| TelemetryError::InvalidFilter(e.to_string()))
}
