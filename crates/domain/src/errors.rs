//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for FinSync
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum FinSyncError {
    /// Referenced local record is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or availability failure talking to the calendar provider.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider event lacks the fields required to build a local event.
    #[error("Unmappable provider event: {0}")]
    Unmappable(String),

    /// Local persistence failure.
    #[error("Store failure: {0}")]
    StoreFailure(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FinSyncError {
    /// True for failures originating on the provider side.
    ///
    /// Provider failures are absorbed by the engine because the local store is
    /// authoritative.
    pub fn is_provider_side(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_) | Self::Auth(_))
    }

    /// True when the error means the referenced record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias for FinSync operations
pub type Result<T> = std::result::Result<T, FinSyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_side_classification() {
        assert!(FinSyncError::ProviderUnavailable("timeout".into()).is_provider_side());
        assert!(FinSyncError::Auth("expired".into()).is_provider_side());
        assert!(!FinSyncError::StoreFailure("locked".into()).is_provider_side());
        assert!(!FinSyncError::NotFound("evt".into()).is_provider_side());
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_string(&FinSyncError::NotFound("evt-1".into())).unwrap();
        assert_eq!(json, r#"{"type":"NotFound","message":"evt-1"}"#);
    }
}
