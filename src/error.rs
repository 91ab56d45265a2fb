//! # Error Types
//!
//! Structured error handling for the compiler and the data access layer using
//! thiserror instead of `Box<dyn Error>` patterns.

use crate::constants::{MYSQL_DUPLICATE_ENTRY, POSTGRES_DUPLICATE_KEY};
use thiserror::Error;

/// Classification of a storage failure reported by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    UniqueViolation,
    ForeignKeyViolation,
    Connection,
    Other,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Session not found in context: {message}")]
    SessionMissing { message: String },

    #[error("Invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Storage error: {operation}: {message}")]
    Storage {
        operation: String,
        message: String,
        kind: StorageErrorKind,
    },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Refusing to {operation} `{table}` without a WHERE clause")]
    MissingWhereClause { operation: String, table: String },

    #[error("No table resolved for {operation}")]
    MissingTable { operation: String },

    #[error("Transaction error: {operation}: {message}")]
    Transaction { operation: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl QueryError {
    pub fn session_missing(message: impl Into<String>) -> Self {
        Self::SessionMissing {
            message: message.into(),
        }
    }

    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an unclassified storage error
    pub fn storage(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::storage_with_kind(operation, message, StorageErrorKind::Other)
    }

    pub fn storage_with_kind(
        operation: impl Into<String>,
        message: impl Into<String>,
        kind: StorageErrorKind,
    ) -> Self {
        Self::Storage {
            operation: operation.into(),
            message: message.into(),
            kind,
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn missing_where_clause(operation: impl Into<String>, table: impl Into<String>) -> Self {
        Self::MissingWhereClause {
            operation: operation.into(),
            table: table.into(),
        }
    }

    pub fn missing_table(operation: impl Into<String>) -> Self {
        Self::MissingTable {
            operation: operation.into(),
        }
    }

    pub fn transaction(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transaction {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Convert a driver error, classifying it from the structured database
    /// error kind where the driver provides one
    pub fn from_sqlx(operation: impl Into<String>, error: &sqlx::Error) -> Self {
        let kind = match error {
            sqlx::Error::Database(db) => match db.kind() {
                sqlx::error::ErrorKind::UniqueViolation => StorageErrorKind::UniqueViolation,
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    StorageErrorKind::ForeignKeyViolation
                }
                _ => StorageErrorKind::Other,
            },
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => StorageErrorKind::Connection,
            _ => StorageErrorKind::Other,
        };
        Self::storage_with_kind(operation, error.to_string(), kind)
    }

    /// Prefix the operation of a storage error with the calling verb. Other
    /// variants are returned unchanged.
    pub fn with_context(self, context: &str) -> Self {
        match self {
            Self::Storage {
                operation,
                message,
                kind,
            } => Self::Storage {
                operation: format!("{context}: {operation}"),
                message,
                kind,
            },
            other => other,
        }
    }

    /// Whether the error reports an already existing record (duplicate key)
    pub fn is_record_exists(&self) -> bool {
        match self {
            Self::Storage { kind, message, .. } => {
                *kind == StorageErrorKind::UniqueViolation
                    || message.contains(MYSQL_DUPLICATE_ENTRY)
                    || message.contains(POSTGRES_DUPLICATE_KEY)
            }
            _ => false,
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string())
    }
}

impl From<config::ConfigError> for QueryError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
