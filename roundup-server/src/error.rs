//! Error types for roundup-server
//!
//! Every failure is scoped to the triggering request. Upstream failures keep
//! the upstream status code and message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::airtable::StoreError;
use crate::mailersend::MailError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Record store failure (upstream status)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Email provider failure (upstream status)
    #[error(transparent)]
    Mail(#[from] MailError),

    /// roundup-common error
    #[error("Common error: {0}")]
    Common(#[from] roundup_common::Error),
}

/// Map an upstream status onto a response status; unknown codes become 502
pub(crate) fn status_from_u16(code: u16) -> StatusCode {
    StatusCode::from_u16(code)
        .ok()
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Store(err) => (
                status_from_u16(err.status_code()),
                json!({ "error": err.to_string() }),
            ),
            ApiError::Mail(MailError::MissingKey) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": MailError::MissingKey.to_string() }),
            ),
            ApiError::Mail(err) => (
                status_from_u16(err.status_code()),
                json!({
                    "error": "Failed to send email",
                    "details": err.to_string(),
                }),
            ),
            ApiError::Common(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": err.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_keeps_upstream_status() {
        let response = ApiError::Store(StoreError::Upstream {
            status: 401,
            message: "Authentication required".into(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_network_errors_are_bad_gateway() {
        let response = ApiError::Store(StoreError::Network("refused".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = ApiError::Mail(MailError::Network("refused".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_missing_key_is_bad_request() {
        let response = ApiError::Mail(MailError::MissingKey).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_non_error_status_maps_to_bad_gateway() {
        assert_eq!(status_from_u16(200), StatusCode::BAD_GATEWAY);
        assert_eq!(status_from_u16(999), StatusCode::BAD_GATEWAY);
        assert_eq!(status_from_u16(429), StatusCode::TOO_MANY_REQUESTS);
    }
}
