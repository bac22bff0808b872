//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when accessing `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Legacy JSON config parsing error")]
    Json(#[from] serde_json::Error),

    #[error("Config serialization error")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation error: {0}")]
    Validation(String),
}
