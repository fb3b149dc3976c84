//! Error types for progress tracking and the question catalog

use common::error::DatabaseError;
use thiserror::Error;

/// SQLSTATE raised by PostgreSQL on a foreign key violation
const FOREIGN_KEY_VIOLATION: &str = "23503";
/// SQLSTATE raised by PostgreSQL on a unique constraint violation
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE raised by PostgreSQL on a CHECK constraint violation
const CHECK_VIOLATION: &str = "23514";
/// SQLSTATE raised for malformed input such as an unknown enum label
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

/// Errors surfaced by the progress core
#[derive(Error, Debug)]
pub enum ProgressError {
    /// Input rejected before or by the store (negative time, bad enum value, ...)
    #[error("{0}")]
    Validation(String),

    /// Unknown user, question or progress row
    #[error("{0}")]
    NotFound(String),

    /// A concurrent writer won a race the store could not resolve
    #[error("{0}")]
    Conflict(String),

    /// No database connection became available within the acquire timeout
    #[error("{0}")]
    ResourceExhausted(String),

    /// Any other storage failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ProgressError {
    pub fn validation(message: impl Into<String>) -> Self {
        ProgressError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ProgressError::NotFound(message.into())
    }
}

impl From<sqlx::Error> for ProgressError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut => ProgressError::ResourceExhausted(
                "Timed out waiting for a database connection".to_string(),
            ),
            sqlx::Error::PoolClosed => {
                ProgressError::ResourceExhausted("Database pool is closed".to_string())
            }
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some(FOREIGN_KEY_VIOLATION) => {
                    ProgressError::NotFound("Referenced user or question does not exist".to_string())
                }
                Some(UNIQUE_VIOLATION) => ProgressError::Conflict(db.message().to_string()),
                Some(CHECK_VIOLATION) | Some(INVALID_TEXT_REPRESENTATION) => {
                    ProgressError::Validation(db.message().to_string())
                }
                _ => ProgressError::Storage(err.to_string()),
            },
            _ => ProgressError::Storage(err.to_string()),
        }
    }
}

impl From<DatabaseError> for ProgressError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Connection(e) | DatabaseError::Query(e) => e.into(),
            other => ProgressError::Storage(other.to_string()),
        }
    }
}

/// Type alias for Result with ProgressError
pub type ProgressResult<T> = Result<T, ProgressError>;
