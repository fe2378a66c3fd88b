//! Calendar provider integration
//!
//! Google Calendar adapter for the `ProviderClient` port plus the token
//! source it authenticates with.

pub mod google;
pub mod token;

pub use google::GoogleCalendarProvider;
pub use token::{AccessTokenSource, StaticTokenSource};
