use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::http::response::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub time: String,
}

/// Liveness probe. Does not touch the store.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: state.api.service_name.clone(),
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Readiness probe: one round trip to the store.
pub async fn ready(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .store
        .ping()
        .await
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
