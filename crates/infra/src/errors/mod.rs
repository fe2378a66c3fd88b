//! Infrastructure error conversions

pub mod conversions;

pub(crate) use conversions::status_to_error;
pub use conversions::InfraError;
