//! Pure reconciliation logic: matching, duplicate resolution and conversion
//!
//! Nothing here performs I/O. The import cycle feeds these functions with
//! owned copies read from the ports.

pub mod converter;
pub mod matcher;
pub mod resolver;

pub use converter::convert;
pub use matcher::{matches, matches_content};
pub use resolver::find_duplicate;
