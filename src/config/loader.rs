//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ForumConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration.
///
/// Starts from the TOML file when one is given (defaults otherwise), applies
/// environment overrides, then validates the result.
pub fn load_config(path: Option<&Path>) -> Result<ForumConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => ForumConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Deserialize a TOML document without validating it.
pub fn parse_config(content: &str) -> Result<ForumConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply the environment variables the deployment uses.
///
/// `lookup` abstracts `std::env::var` so tests do not mutate process state.
pub fn apply_env_overrides<F>(config: &mut ForumConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("PGHOST") {
        config.database.host = host;
    }

    if let Some(port) = lookup("PGPORT") {
        match port.parse::<u16>() {
            Ok(port) => config.database.port = port,
            Err(_) => tracing::warn!(value = %port, "Invalid PGPORT, using configured port"),
        }
    }

    if let Some(user) = lookup("PGUSER") {
        config.database.user = user;
    }

    if let Some(password) = lookup("PGPASSWORD") {
        config.database.password = password;
    }

    if let Some(database) = lookup("PGDATABASE") {
        config.database.database = database;
    }

    if let Some(upstream) = lookup("API_UPSTREAM") {
        config.proxy.upstream = upstream;
    }

    if let Some(addr) = lookup("FORUM_BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }

    if let Some(addr) = lookup("PROXY_BIND_ADDRESS") {
        config.proxy.bind_address = addr;
    }
}
