pub mod health;
pub mod properties;
pub mod tokens;

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use guestlink_domain::GuestLinkError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert domain errors to HTTP responses
#[derive(Debug)]
pub struct ApiError(pub GuestLinkError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            GuestLinkError::Validation(_) => StatusCode::BAD_REQUEST,
            GuestLinkError::NotFound(_) | GuestLinkError::PropertyNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            GuestLinkError::Expired(_) => StatusCode::GONE,
            GuestLinkError::CodeRequired | GuestLinkError::InvalidCode => StatusCode::UNAUTHORIZED,
            GuestLinkError::Auth(_) => StatusCode::FORBIDDEN,
            GuestLinkError::Network(_) | GuestLinkError::UpstreamFetch(_) => {
                StatusCode::BAD_GATEWAY
            }
            GuestLinkError::Persistence(_)
            | GuestLinkError::Config(_)
            | GuestLinkError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message; server-side details stay in the logs.
    fn public_message(&self) -> String {
        match &self.0 {
            GuestLinkError::Persistence(_) => "the request could not be stored".to_string(),
            GuestLinkError::Config(_) => "the service is not configured for this request".to_string(),
            GuestLinkError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error_type = self.0.label(), error = %self.0, "request failed");
        }

        let body = Json(ErrorResponse {
            error: self.0.code().to_string(),
            message: self.public_message(),
        });
        (status, body).into_response()
    }
}

impl From<GuestLinkError> for ApiError {
    fn from(err: GuestLinkError) -> Self {
        Self(err)
    }
}

/// Decode a JSON body; an empty body yields the default value.
pub(crate) fn json_or_default<T>(body: &Bytes) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    json_body(body)
}

/// Decode a required JSON body.
pub(crate) fn json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| {
        ApiError(GuestLinkError::Validation(format!("invalid request body: {err}")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (GuestLinkError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (GuestLinkError::PropertyNotFound("p".into()), StatusCode::NOT_FOUND),
            (GuestLinkError::Expired("x".into()), StatusCode::GONE),
            (GuestLinkError::CodeRequired, StatusCode::UNAUTHORIZED),
            (GuestLinkError::Auth("paused".into()), StatusCode::FORBIDDEN),
            (GuestLinkError::Network("refused".into()), StatusCode::BAD_GATEWAY),
            (GuestLinkError::Config("pepper".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[test]
    fn persistence_details_are_not_echoed() {
        let err = ApiError(GuestLinkError::Persistence("UNIQUE constraint failed: tokens".into()));
        assert!(!err.public_message().contains("UNIQUE"));
    }

    #[test]
    fn empty_body_decodes_to_default() {
        let options: guestlink_domain::SyncOptions = json_or_default(&Bytes::new()).unwrap();
        assert!(!options.force);

        let err = json_body::<guestlink_domain::SyncOptions>(&Bytes::from_static(b"{"));
        assert!(matches!(err, Err(ApiError(GuestLinkError::Validation(_)))));
    }
}
