//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure shared by the
//! API service and the edge proxy. All types derive Serde traits for
//! deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the forum services.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ForumConfig {
    /// API service listener.
    pub listener: ListenerConfig,

    /// PostgreSQL connection settings.
    pub database: DatabaseConfig,

    /// API behavior switches.
    pub api: ApiConfig,

    /// Edge proxy settings.
    pub proxy: ProxyConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits and CORS.
    pub security: SecurityConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Database connection settings.
///
/// Defaults match the development docker-compose setup.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Env: `PGHOST`
    pub host: String,

    /// Env: `PGPORT`
    pub port: u16,

    /// Env: `PGUSER`
    pub user: String,

    /// Env: `PGPASSWORD`
    pub password: String,

    /// Env: `PGDATABASE`
    pub database: String,

    /// Maximum pooled connections.
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection.
    pub acquire_timeout_secs: u64,

    /// Apply embedded migrations at startup.
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "wsd_project_database".to_string(),
            port: 5432,
            user: "username".to_string(),
            password: "password".to_string(),
            database: "database".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 5,
            run_migrations: true,
        }
    }
}

// Hand-written so the password never lands in logs.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

/// API behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Name reported by the health endpoint.
    pub service_name: String,

    /// Answer 404 instead of `200 null` when a single-row lookup misses.
    pub strict_not_found: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            service_name: "discussion-forum-api".to_string(),
            strict_not_found: false,
        }
    }
}

/// Edge proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Bind address for the browser-facing listener.
    pub bind_address: String,

    /// Upstream base URL (env: `API_UPSTREAM`).
    pub upstream: String,

    /// Path prefix that is forwarded (no trailing slash).
    pub path_prefix: String,

    /// Request headers copied to the upstream request (case-insensitive).
    pub forward_headers: Vec<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            upstream: "http://localhost:8000".to_string(),
            path_prefix: "/api".to_string(),
            forward_headers: default_forward_headers(),
        }
    }
}

fn default_forward_headers() -> Vec<String> {
    [
        "accept",
        "accept-encoding",
        "accept-language",
        "authorization",
        "cache-control",
        "content-type",
        "cookie",
        "if-match",
        "if-modified-since",
        "if-none-match",
        "origin",
        "referer",
        "user-agent",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time for an inbound request, in seconds.
    pub request_secs: u64,

    /// Time allowed for the upstream round trip in the proxy, in seconds.
    pub upstream_secs: u64,

    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 30,
            connect_secs: 5,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,

    /// Allow cross-origin browser requests.
    pub cors_enabled: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
            cors_enabled: true,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,

    /// Default filter directive; `RUST_LOG` takes precedence.
    pub log_filter: String,

    /// Expose Prometheus metrics.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_filter: "discussion_forum=debug,tower_http=debug".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
