//! Database implementations

pub mod event_repository;
pub mod manager;

pub use event_repository::*;
pub use manager::*;
