//! Edge proxy subsystem.
//!
//! # Data Flow
//! ```text
//! Browser request under {path_prefix}/*
//!     → server.rs (buffer body, request id)
//!     → upstream.rs (rewrite onto the upstream base URL)
//!     → headers.rs (allow-listed headers + X-Forwarded-*)
//!     → hyper client → API service
//!     → headers.rs (strip hop-by-hop) → stream response back
//! ```
//!
//! # Design Decisions
//! - One inbound request maps to exactly one upstream call; no retries
//! - Status and body are relayed unchanged
//! - Upstream failures become 502/504 with the API's error envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

pub mod headers;
pub mod server;
pub mod upstream;

pub use headers::{ForwardContext, HeaderPolicy};
pub use server::EdgeProxy;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Invalid upstream: {0}")]
    InvalidUpstream(String),

    #[error("Request body too large")]
    BodyTooLarge,

    #[error("Invalid request body")]
    BodyRead(#[source] axum::Error),

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("Upstream request timed out")]
    Timeout,
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidUpstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::BodyRead(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let message = match &self {
            ProxyError::Upstream(_) => "Upstream request failed".to_string(),
            ProxyError::InvalidUpstream(_) => "Proxy misconfigured".to_string(),
            _ => self.to_string(),
        };
        (self.status(), Json(serde_json::json!({ "error": message }))).into_response()
    }
}
