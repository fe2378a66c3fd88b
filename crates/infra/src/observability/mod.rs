//! Observability infrastructure for logging and sync metrics
//!
//! Metrics are plain atomic counters owned by the scheduler and read back as
//! snapshots; logs go through `tracing`.

pub mod logging;
pub mod metrics;

pub use logging::{init_tracing, json_logs_requested};
pub use metrics::{SyncMetrics, SyncMetricsSnapshot};

/// Metrics error type
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Empty data set - cannot calculate aggregate metric
    #[error("Empty data: cannot calculate {metric}")]
    EmptyData {
        /// Metric name that failed (e.g., "average")
        metric: &'static str,
    },
}

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;
