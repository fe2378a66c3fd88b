//! Metrics collection modules
//!
//! Thread-safe metrics for the sync subsystem.

pub mod sync;

pub use sync::{SyncMetrics, SyncMetricsSnapshot};
