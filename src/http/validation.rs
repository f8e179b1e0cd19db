//! Input checks run before anything reaches the store.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde_json::Value;

use crate::http::response::ApiError;

/// Minimum trimmed length for names, titles and question text.
pub const MIN_TEXT_LEN: usize = 3;

/// Parse a route parameter as a row id.
///
/// Surrounding whitespace is ignored; anything else that is not a base-10
/// integer in `i32` range (empty, `abc`, `1.5`) is rejected with a message
/// naming `field`.
pub fn parse_id(value: &str, field: &str) -> Result<i32, ApiError> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| ApiError::validation(format!("{} must be a valid integer", field)))
}

/// True iff `value` is a JSON string with at least [`MIN_TEXT_LEN`]
/// characters once trimmed.
pub fn is_valid_text(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| s.trim().chars().count() >= MIN_TEXT_LEN)
}

/// Turn an axum JSON extraction failure into the API error envelope.
pub fn json_body_error(rejection: JsonRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::PayloadTooLarge;
    }
    tracing::debug!(error = %rejection.body_text(), "Rejected request body");
    ApiError::validation("Invalid JSON body")
}
