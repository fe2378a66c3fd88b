//! # FinSync Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite event repository and connection management
//! - Google Calendar provider client
//! - Configuration loading, tracing setup and sync metrics
//! - The periodic sync scheduler
//!
//! ## Architecture
//! - Implements traits defined in `finsync-core`
//! - Contains all "impure" code (I/O, HTTP, timers)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod observability;
pub mod scheduling;
pub mod services;

// Re-export commonly used items
pub use database::{DbManager, SqliteEventRepository};
pub use errors::InfraError;
pub use http::HttpClient;
pub use integrations::calendar::{AccessTokenSource, GoogleCalendarProvider, StaticTokenSource};
pub use observability::{SyncMetrics, SyncMetricsSnapshot};
pub use scheduling::{SchedulerError, SyncScheduler, SyncSchedulerConfig};
pub use services::BroadcastViewRefresh;
