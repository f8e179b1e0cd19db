//! Configuration validation.
//!
//! Serde handles syntax; this module checks that values make sense
//! together (addresses parse, the upstream is an http or https URL,
//! limits are non-zero). Every problem is reported, not just the first.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ForumConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a fully-deserialized configuration.
pub fn validate_config(config: &ForumConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_socket_addr(&mut errors, "proxy.bind_address", &config.proxy.bind_address);

    if let Err(e) = parse_upstream(&config.proxy.upstream) {
        errors.push(ValidationError::new("proxy.upstream", e));
    }

    let prefix = &config.proxy.path_prefix;
    if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
        errors.push(ValidationError::new(
            "proxy.path_prefix",
            format!("'{}' must start with '/' and not end with '/'", prefix),
        ));
    }

    for name in &config.proxy.forward_headers {
        if axum::http::HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::new(
                "proxy.forward_headers",
                format!("'{}' is not a valid header name", name),
            ));
        }
    }

    if config.database.host.trim().is_empty() {
        errors.push(ValidationError::new("database.host", "must not be empty"));
    }
    if config.database.port == 0 {
        errors.push(ValidationError::new("database.port", "must be non-zero"));
    }
    if config.database.max_connections == 0 {
        errors.push(ValidationError::new("database.max_connections", "must be at least 1"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be non-zero"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::new("timeouts.upstream_secs", "must be non-zero"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be non-zero"));
    }

    if config.observability.metrics_enabled {
        check_socket_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse an upstream base URL. Only `http` and `https` with a host are accepted.
pub fn parse_upstream(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("'{}' is not a valid URL: {}", raw, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("scheme '{}' is not supported, use http or https", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err(format!("'{}' has no host", raw));
    }
    Ok(url)
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            field,
            format!("'{}' is not a socket address", value),
        ));
    }
}
