//! Structured error handling for the SSOT data layer
//!
//! Database failures carry the operation that was running so that a failed
//! import can be traced back to the statement without re-running it.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for database operations
pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

/// Result type alias for file loading and import orchestration
pub type ImportResult<T> = std::result::Result<T, ImportError>;

/// Database operation type for error context
#[derive(Debug, Clone)]
pub enum DatabaseOperation {
    /// Member import steps
    UpsertPeople {
        count: usize,
    },
    UpsertUser {
        slack_user_id: String,
    },
    UpsertUserOrganization {
        slack_user_id: String,
        organization_id: String,
    },
    CountUsersByStatus {
        status: String,
    },
    ListMultiAccountPeople,

    /// Contact import
    InsertContact {
        id: String,
    },

    /// Generic operations
    Connect,
    Transaction {
        description: String,
    },
}

impl fmt::Display for DatabaseOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpsertPeople { count } => write!(f, "upsert_people(count={count})"),
            Self::UpsertUser { slack_user_id } => write!(f, "upsert_user(slack={slack_user_id})"),
            Self::UpsertUserOrganization {
                slack_user_id,
                organization_id,
            } => write!(
                f,
                "upsert_user_organization(slack={slack_user_id}, org={organization_id})"
            ),
            Self::CountUsersByStatus { status } => {
                write!(f, "count_users(status={status})")
            }
            Self::ListMultiAccountPeople => write!(f, "list_multi_account_people"),
            Self::InsertContact { id } => write!(f, "insert_contact(id={id})"),
            Self::Connect => write!(f, "connect"),
            Self::Transaction { description } => write!(f, "transaction({description})"),
        }
    }
}

/// Errors raised by the Postgres repository
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Pool creation or connection error
    #[error("Database connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: sqlx::Error,
    },

    /// Query execution error
    #[error("Query failed for operation '{operation}': {message}")]
    QueryFailed {
        operation: Box<DatabaseOperation>,
        message: String,
        #[source]
        source: sqlx::Error,
    },

    /// Constraint violation (typically a foreign key to a missing organization)
    #[error("Database constraint violation '{constraint}' (operation='{operation}')")]
    ConstraintViolation {
        constraint: String,
        operation: Box<DatabaseOperation>,
        #[source]
        source: sqlx::Error,
    },

    /// Transaction rollback
    #[error("Transaction rolled back for operation '{operation}': {reason}")]
    TransactionRollback {
        operation: Box<DatabaseOperation>,
        reason: String,
    },

    /// Unexpected database state
    #[error("Unexpected database state for operation '{operation}': {message}")]
    UnexpectedState {
        operation: Box<DatabaseOperation>,
        message: String,
    },
}

impl DatabaseError {
    /// Create a query failed error from `sqlx::Error`
    pub fn query_failed(operation: DatabaseOperation, source: sqlx::Error) -> Self {
        if let Some(constraint) = source
            .as_database_error()
            .and_then(|db_err| db_err.constraint())
            .map(str::to_string)
        {
            return Self::ConstraintViolation {
                constraint,
                operation: Box::new(operation),
                source,
            };
        }

        Self::QueryFailed {
            operation: Box::new(operation),
            message: source.to_string(),
            source,
        }
    }

    /// Create a connection failed error
    pub fn connection_failed(source: sqlx::Error) -> Self {
        Self::ConnectionFailed {
            message: source.to_string(),
            source,
        }
    }

    /// The operation that failed, when known
    pub fn operation(&self) -> Option<&DatabaseOperation> {
        match self {
            Self::QueryFailed { operation, .. }
            | Self::ConstraintViolation { operation, .. }
            | Self::TransactionRollback { operation, .. }
            | Self::UnexpectedState { operation, .. } => Some(operation.as_ref()),
            Self::ConnectionFailed { .. } => None,
        }
    }
}

/// Extension trait for converting sqlx errors with context
pub trait DatabaseErrorExt<T> {
    /// Convert to `DatabaseError` with operation context
    ///
    /// # Errors
    /// Returns `DatabaseError` carrying the operation
    fn map_db_err(self, operation: DatabaseOperation) -> DatabaseResult<T>;
}

impl<T> DatabaseErrorExt<T> for std::result::Result<T, sqlx::Error> {
    fn map_db_err(self, operation: DatabaseOperation) -> DatabaseResult<T> {
        self.map_err(|e| DatabaseError::query_failed(operation, e))
    }
}

/// Errors raised while loading member/contact sources and importing them
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid members file {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_operation_display() {
        let op = DatabaseOperation::UpsertUserOrganization {
            slack_user_id: "U01".to_string(),
            organization_id: "unson".to_string(),
        };
        assert_eq!(
            op.to_string(),
            "upsert_user_organization(slack=U01, org=unson)"
        );
    }

    #[test]
    fn test_query_failed_keeps_operation() {
        let err = DatabaseError::query_failed(
            DatabaseOperation::InsertContact {
                id: "cnt_1".to_string(),
            },
            sqlx::Error::RowNotFound,
        );
        assert!(matches!(err, DatabaseError::QueryFailed { .. }));
        assert!(err.to_string().contains("insert_contact(id=cnt_1)"));
        assert!(matches!(
            err.operation(),
            Some(DatabaseOperation::InsertContact { .. })
        ));
    }
}
