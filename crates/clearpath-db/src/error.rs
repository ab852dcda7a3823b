//! Database error types.

use thiserror::Error;

/// Store-specific errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to open or create the database.
    #[error("failed to open database: {0}")]
    Open(String),

    /// Migration execution failed.
    #[error("migration failed: {0}")]
    Migration(String),

    /// Requested record was not found.
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Kind of record
        entity: &'static str,
        /// Identifier looked up
        id: String,
    },

    /// A write would replace a record that is set at most once.
    #[error("{entity} for '{id}' already recorded")]
    AlreadyRecorded {
        /// Kind of record
        entity: &'static str,
        /// Owning identifier
        id: String,
    },

    /// Failed to decode a stored value.
    #[error("decode error: {0}")]
    Decode(String),

    /// JSON column (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying `SQLx` error.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// I/O error while preparing the database location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DatabaseError {
    pub(crate) fn job_not_found(id: &clearpath_core::JobId) -> Self {
        Self::NotFound {
            entity: "job",
            id: id.to_string(),
        }
    }

    pub(crate) fn decode(column: &str, err: impl std::fmt::Display) -> Self {
        Self::Decode(format!("column '{column}': {err}"))
    }
}

/// Result type alias for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
