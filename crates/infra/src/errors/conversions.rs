//! Conversions from external infrastructure errors into domain errors.

use finsync_domain::FinSyncError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub FinSyncError);

impl From<InfraError> for FinSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<FinSyncError> for InfraError {
    fn from(value: FinSyncError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoFinSyncError {
    fn into_finsync(self) -> FinSyncError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → FinSyncError */
/* -------------------------------------------------------------------------- */

/// `SQLITE_CONSTRAINT_UNIQUE`
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

impl IntoFinSyncError for SqlError {
    fn into_finsync(self) -> FinSyncError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        FinSyncError::StoreFailure("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        FinSyncError::StoreFailure("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, SQLITE_CONSTRAINT_UNIQUE) => {
                        FinSyncError::StoreFailure(format!(
                            "unique constraint violation: {message}"
                        ))
                    }
                    _ => FinSyncError::StoreFailure(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => FinSyncError::NotFound("no rows returned by query".into()),
            RE::InvalidQuery => FinSyncError::StoreFailure("invalid SQL query".into()),
            other => FinSyncError::StoreFailure(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_finsync())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → FinSyncError */
/* -------------------------------------------------------------------------- */

impl IntoFinSyncError for r2d2::Error {
    fn into_finsync(self) -> FinSyncError {
        FinSyncError::StoreFailure(format!("connection pool error: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_finsync())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → FinSyncError */
/* -------------------------------------------------------------------------- */

impl IntoFinSyncError for HttpError {
    fn into_finsync(self) -> FinSyncError {
        if self.is_timeout() {
            return FinSyncError::ProviderUnavailable("HTTP request timed out".into());
        }

        if self.is_connect() {
            return FinSyncError::ProviderUnavailable("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            return status_to_error(status.as_u16(), status.canonical_reason());
        }

        if self.is_decode() {
            return FinSyncError::ProviderUnavailable(format!(
                "malformed provider response: {self}"
            ));
        }

        FinSyncError::ProviderUnavailable(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_finsync())
    }
}

/// Map an HTTP status from the provider onto the domain taxonomy.
pub(crate) fn status_to_error(code: u16, reason: Option<&str>) -> FinSyncError {
    let message = format!("HTTP {} {}", code, reason.unwrap_or("unknown status"));
    match code {
        401 | 403 => FinSyncError::Auth(message),
        404 | 410 => FinSyncError::NotFound(message),
        429 => FinSyncError::ProviderUnavailable(message),
        400..=499 => FinSyncError::InvalidInput(message),
        _ => FinSyncError::ProviderUnavailable(message),
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use rusqlite::ffi::{Error as FfiError, ErrorCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn sqlite_busy_maps_to_store_failure() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::DatabaseBusy, extended_code: 5 },
            Some("database is locked".into()),
        );

        let mapped: FinSyncError = InfraError::from(err).into();
        match mapped {
            FinSyncError::StoreFailure(msg) => assert!(msg.contains("busy")),
            other => panic!("expected store failure, got {other:?}"),
        }
    }

    #[test]
    fn sqlite_unique_violation_is_reported() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::ConstraintViolation, extended_code: 2067 },
            Some("UNIQUE constraint failed: events.provider_id".into()),
        );

        let mapped: FinSyncError = InfraError::from(err).into();
        match mapped {
            FinSyncError::StoreFailure(msg) => assert!(msg.contains("unique constraint")),
            other => panic!("expected store failure, got {other:?}"),
        }
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let mapped: FinSyncError = InfraError::from(SqlError::QueryReturnedNoRows).into();
        assert!(mapped.is_not_found());
    }

    #[test]
    fn status_codes_follow_provider_taxonomy() {
        assert!(matches!(status_to_error(401, None), FinSyncError::Auth(_)));
        assert!(matches!(status_to_error(410, Some("Gone")), FinSyncError::NotFound(_)));
        assert!(matches!(status_to_error(429, None), FinSyncError::ProviderUnavailable(_)));
        assert!(matches!(status_to_error(400, None), FinSyncError::InvalidInput(_)));
        assert!(matches!(status_to_error(503, None), FinSyncError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn http_status_401_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: FinSyncError = InfraError::from(error).into();
        match mapped {
            FinSyncError::Auth(msg) => assert!(msg.contains("401")),
            other => panic!("expected auth error, got {other:?}"),
        }
    }
}
