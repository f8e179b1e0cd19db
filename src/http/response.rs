//! Response rendering for the API service.
//!
//! Every failure leaves the service as `{"error": message}` with a status
//! chosen by [`ApiError`]. Store failures are logged in full but rendered
//! with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed id, short text, or an unreadable body.
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Request timed out")]
    Timeout,

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(StoreError::CourseNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Store(StoreError::CourseNotFound(_)) => "Course not found".to_string(),
            ApiError::Store(e) => {
                tracing::error!(error = %e, "Store operation failed");
                "Internal server error".to_string()
            }
            ApiError::Unavailable(e) => {
                tracing::warn!(error = %e, "Readiness check failed");
                "Service unavailable".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Give the bare 408 produced by the timeout layer the error envelope.
pub async fn timeout_envelope(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        tracing::warn!("Request timed out");
        return ApiError::Timeout.into_response();
    }
    response
}

/// Render the outcome of a single-row operation.
///
/// A hit is the row as JSON. A miss is `404` in strict mode and `200 null`
/// otherwise.
pub fn single_row<T: Serialize>(
    row: Option<T>,
    what: &'static str,
    strict_not_found: bool,
) -> Result<Response, ApiError> {
    match row {
        Some(row) => Ok(Json(row).into_response()),
        None if strict_not_found => Err(ApiError::NotFound(what)),
        None => Ok(Json(serde_json::Value::Null).into_response()),
    }
}
