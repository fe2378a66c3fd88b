//! Synchronization with the external calendar provider

pub mod deletion;
pub mod import;
pub mod linker;
pub mod ports;

pub use deletion::DeletionPropagator;
pub use import::{ImportCycle, ImportSettings};
pub use linker::LinkMaintainer;
