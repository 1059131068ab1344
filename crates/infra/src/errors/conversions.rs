//! Conversions from external infrastructure errors into domain errors.

use guestlink_domain::GuestLinkError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub GuestLinkError);

impl From<InfraError> for GuestLinkError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<GuestLinkError> for InfraError {
    fn from(value: GuestLinkError) -> Self {
        InfraError(value)
    }
}

trait IntoGuestLinkError {
    fn into_guestlink(self) -> GuestLinkError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → GuestLinkError */
/* -------------------------------------------------------------------------- */

impl IntoGuestLinkError for SqlError {
    fn into_guestlink(self) -> GuestLinkError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        GuestLinkError::Persistence("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        GuestLinkError::Persistence("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067 | 1555) => {
                        GuestLinkError::Persistence("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        GuestLinkError::Persistence("foreign key constraint violation".into())
                    }
                    _ => GuestLinkError::Persistence(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                GuestLinkError::Persistence("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                GuestLinkError::Persistence(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                GuestLinkError::Persistence(format!("invalid column type for {name}: {ty}"))
            }
            RE::Utf8Error(_) => {
                GuestLinkError::Persistence("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidPath(path) => GuestLinkError::Persistence(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => GuestLinkError::Persistence(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_guestlink())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → GuestLinkError */
/* -------------------------------------------------------------------------- */

impl IntoGuestLinkError for r2d2::Error {
    fn into_guestlink(self) -> GuestLinkError {
        GuestLinkError::Persistence(format!("connection pool error: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_guestlink())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → GuestLinkError */
/* -------------------------------------------------------------------------- */

/// Connection-level failures become `Network` (eligible for the proxy
/// fallback); everything else is a final `UpstreamFetch`.
///
/// The URL is stripped before rendering: feed URLs carry secrets.
impl IntoGuestLinkError for HttpError {
    fn into_guestlink(self) -> GuestLinkError {
        let err = self.without_url();

        if err.is_timeout() {
            return GuestLinkError::Network("HTTP request timed out".into());
        }

        if err.is_connect() {
            return GuestLinkError::Network("HTTP connection failure".into());
        }

        if let Some(status) = err.status() {
            return GuestLinkError::UpstreamFetch(status_message(status));
        }

        if err.is_request() {
            return GuestLinkError::Network(format!("HTTP request failed: {err}"));
        }

        GuestLinkError::UpstreamFetch(err.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_guestlink())
    }
}

/// `HTTP 503 Service Unavailable`
pub fn status_message(status: reqwest::StatusCode) -> String {
    format!("HTTP {} {}", status.as_u16(), status.canonical_reason().unwrap_or("unknown status"))
}

/// Shorthand used by repositories inside blocking closures.
pub fn map_sql_error(err: SqlError) -> GuestLinkError {
    GuestLinkError::from(InfraError::from(err))
}

pub fn map_pool_error(err: r2d2::Error) -> GuestLinkError {
    GuestLinkError::from(InfraError::from(err))
}

pub fn map_http_error(err: HttpError) -> GuestLinkError {
    GuestLinkError::from(InfraError::from(err))
}

pub fn map_join_error(err: JoinError) -> GuestLinkError {
    if err.is_cancelled() {
        GuestLinkError::Internal("blocking task cancelled".into())
    } else {
        GuestLinkError::Internal(format!("blocking task failed: {err}"))
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
    fn sqlite_busy_maps_to_persistence_error() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::DatabaseBusy, extended_code: 5 },
            Some("database is locked".into()),
        );

        match map_sql_error(err) {
            GuestLinkError::Persistence(msg) => assert!(msg.contains("busy")),
            other => panic!("expected persistence error, got {other:?}"),
        }
    }

    #[test]
    fn unique_violation_is_named() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::ConstraintViolation, extended_code: 2067 },
            None,
        );

        assert_eq!(
            map_sql_error(err),
            GuestLinkError::Persistence("unique constraint violation".into())
        );
    }

    #[tokio::test]
    async fn http_status_maps_to_upstream_fetch_without_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::SERVICE_UNAVAILABLE))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let url = format!("{}/feed.ics?s=top-secret", server.uri());
        let error = client.get(&url).send().await.unwrap().error_for_status().unwrap_err();

        match map_http_error(error) {
            GuestLinkError::UpstreamFetch(msg) => {
                assert!(msg.contains("503"));
                assert!(!msg.contains("top-secret"));
            }
            other => panic!("expected upstream fetch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refused_connection_maps_to_network() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}/feed.ics")).send().await.unwrap_err();

        let mapped = map_http_error(error);
        assert!(mapped.is_connection_failure(), "expected network error, got {mapped:?}");
    }
}
