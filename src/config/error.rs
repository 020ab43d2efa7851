use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file '{0}' does not exist. Copy config.toml.example and fill in the required parameters")]
    NotFound(PathBuf),

    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("Met Office DataHub API key and/or secret are not set")]
    MissingCredentials,

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}
