//! User-facing event operations

pub mod service;

pub use service::EventService;
