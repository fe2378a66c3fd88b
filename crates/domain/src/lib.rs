//! # FinSync Domain
//!
//! Business domain types and models for FinSync.
//!
//! This crate contains:
//! - Local and provider event types plus sync metadata
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants (sync window bounds, boilerplate phrases)
//!
//! ## Architecture
//! - No dependencies on other FinSync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
// Re-export keyword classifier
pub use utils::event_classifier::classify_event;
