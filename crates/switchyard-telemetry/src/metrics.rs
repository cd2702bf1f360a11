//! Dispatch metrics.
//!
//! Recorded through the `metrics` facade; installing an exporter is left to
//! the host application. Without one, recording is a no-op.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `switchyard_dispatch_total` | Counter | `outcome` | Dispatched requests |
//! | `switchyard_dispatch_duration_seconds` | Histogram | `outcome` | Dispatch latency |
//! | `switchyard_routes_registered` | Gauge | - | Routes in the active table |

use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// Request counter name.
pub const DISPATCH_TOTAL: &str = "switchyard_dispatch_total";
/// Latency histogram name.
pub const DISPATCH_DURATION: &str = "switchyard_dispatch_duration_seconds";
/// Route count gauge name.
pub const ROUTES_REGISTERED: &str = "switchyard_routes_registered";

/// How a dispatch ended, used as the `outcome` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A route matched and the pipeline returned a reply.
    Ok,
    /// No route matched.
    NotFound,
    /// A 4xx failure was rendered.
    ClientError,
    /// A 5xx failure was rendered.
    ServerError,
}

impl Outcome {
    /// Classifies a rendered failure by status code.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => Self::NotFound,
            400..=499 => Self::ClientError,
            500..=599 => Self::ServerError,
            _ => Self::Ok,
        }
    }

    /// Label value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotFound => "not_found",
            Self::ClientError => "client_error",
            Self::ServerError => "server_error",
        }
    }
}

/// Registers descriptions for the dispatch metrics.
pub fn describe_metrics() {
    describe_counter!(DISPATCH_TOTAL, "Total number of dispatched requests");
    describe_histogram!(DISPATCH_DURATION, "Dispatch duration in seconds");
    describe_gauge!(ROUTES_REGISTERED, "Number of routes in the route table");
}

/// Records one finished dispatch.
pub fn record_dispatch(outcome: Outcome, duration: Duration) {
    counter!(DISPATCH_TOTAL, "outcome" => outcome.as_str()).increment(1);
    histogram!(DISPATCH_DURATION, "outcome" => outcome.as_str()).record(duration.as_secs_f64());
}

/// Publishes the size of the route table.
#[allow(clippy::cast_precision_loss)]
pub fn set_routes_registered(count: usize) {
    gauge!(ROUTES_REGISTERED).set(count as f64);
}
