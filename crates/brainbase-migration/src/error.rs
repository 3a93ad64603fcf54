//! Error types for the migration tooling

use brainbase_config::ConfigError;
use thiserror::Error;

/// Errors raised while talking to Airtable or NocoDB
///
/// Callers treat these per item: a failed record, column, table or base is
/// recorded in the report and the run moves on.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// Transport level failure (connect, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with a non-success status
    #[error("{service} API error {status} on {method} {path}: {body}")]
    Api {
        service: &'static str,
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    /// Response body did not have the expected shape
    #[error("Unexpected response from {context}: {message}")]
    UnexpectedResponse { context: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Table '{table}' not found in NocoDB base {base}")]
    TableNotFound { table: String, base: String },

    #[error("Unknown Airtable base '{0}' (not in config.yml)")]
    UnknownBase(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MigrationError {
    pub fn unexpected(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            context: context.into(),
            message: message.into(),
        }
    }

    /// HTTP status for API errors
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for migration operations
pub type MigrationResult<T> = Result<T, MigrationError>;
