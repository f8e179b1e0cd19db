//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → ForumConfig (validated, immutable)
//!     → cloned into the API server and the edge proxy
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so both binaries start with zero configuration
//! - `PG*` and `API_UPSTREAM` environment variables win over the file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ApiConfig, DatabaseConfig, ForumConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    ProxyConfig, SecurityConfig, TimeoutConfig,
};
