//! Error types for Lineage configuration

use thiserror::Error;

/// Failure to load or parse a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
