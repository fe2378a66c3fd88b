//! Access token sources for the calendar provider
//!
//! Token acquisition and refresh happen outside this crate; the provider only
//! asks for a currently valid bearer token before each request.

use async_trait::async_trait;
use finsync_domain::{FinSyncError, Result};

/// Trait for providing access tokens
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    /// Get a bearer token that is valid for the next request
    async fn access_token(&self) -> Result<String>;
}

/// Fixed token handed over by the host application.
#[derive(Clone)]
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl std::fmt::Debug for StaticTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenSource").field("token", &"<redacted>").finish()
    }
}

#[async_trait]
impl AccessTokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<String> {
        if self.token.trim().is_empty() {
            return Err(FinSyncError::Auth("no provider access token configured".into()));
        }
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_source_returns_its_token() {
        let source = StaticTokenSource::new("test-token");
        assert_eq!(source.access_token().await.unwrap(), "test-token");
    }

    #[tokio::test]
    async fn blank_token_is_an_auth_error() {
        let err = StaticTokenSource::new("  ").access_token().await.unwrap_err();
        assert!(matches!(err, FinSyncError::Auth(_)));
    }

    #[test]
    fn debug_output_hides_token() {
        let rendered = format!("{:?}", StaticTokenSource::new("secret"));
        assert!(!rendered.contains("secret"));
    }
}
