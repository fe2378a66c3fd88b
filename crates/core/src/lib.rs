//! # FinSync Core
//!
//! Pure reconciliation logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for the event store, calendar provider, view
//!   refresh and clock
//! - Similarity matching, duplicate resolution and provider conversion
//! - The import cycle, link maintainer and deletion propagator
//! - The user-facing event service
//!
//! ## Architecture Principles
//! - Only depends on `finsync-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod events;
pub mod reconcile;
pub mod sync;

pub use events::EventService;
pub use reconcile::{convert, find_duplicate, matches};
pub use sync::ports::{
    Clock, EventStore, NoopViewRefresh, ProviderClient, SystemClock, ViewRefresh,
};
pub use sync::{DeletionPropagator, ImportCycle, ImportSettings, LinkMaintainer};
