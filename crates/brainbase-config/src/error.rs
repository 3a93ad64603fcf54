//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
///
/// Every variant is fatal: the command aborts before touching any remote
/// service.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is not set
    #[error("Environment variable {var} is not set{alternatives}")]
    MissingEnv { var: String, alternatives: String },

    /// Invalid URL format
    #[error("Invalid URL for {field}: {url}")]
    InvalidUrl { field: String, url: String },

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Invalid range value
    #[error("Value {value} is out of range for {field} (expected {min}-{max})")]
    OutOfRange {
        field: String,
        value: u64,
        min: u64,
        max: u64,
    },

    /// Config file does not exist
    #[error("Config file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// YAML parsing error
    #[error("Failed to parse {}: {source}", path.display())]
    YamlParsing {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Database URL could not be turned into connect options
    #[error("Invalid database URL: {message}")]
    InvalidDatabaseUrl { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
