//! Service layer implementations.
//!
//! Adapters for the presentation-facing ports of the engine.

pub mod view_refresh;

pub use view_refresh::BroadcastViewRefresh;
