//! Errors raised while configuring the pool, opening connections to the
//! entity store and migrating its schema.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Failures of the shared PostgreSQL plumbing
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The pool could not open or hand out a connection to `DATABASE_URL`
    #[error("Could not reach the entity store: {0}")]
    Connection(#[source] SqlxError),

    /// A statement outside the progress repositories failed
    #[error("Entity store query failed: {0}")]
    Query(#[source] SqlxError),

    /// A schema migration step failed; the message names the step
    #[error("Schema migration failed at {0}")]
    Migration(String),

    /// `DATABASE_*` variables are malformed or inconsistent, e.g. a minimum
    /// pool size above the maximum
    #[error("Invalid pool settings: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Wrap a failed migration statement, keeping the failing step in the message
    pub fn migration(step: &str, source: SqlxError) -> Self {
        DatabaseError::Migration(format!("{step}: {source}"))
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_errors_name_the_step() {
        let err = DatabaseError::migration("advisory lock", SqlxError::PoolClosed);
        let message = err.to_string();
        assert!(message.starts_with("Schema migration failed at advisory lock: "));
    }

    #[test]
    fn connection_errors_keep_their_source() {
        use std::error::Error as _;

        let err = DatabaseError::Connection(SqlxError::PoolTimedOut);
        assert!(err.source().is_some());
    }
}
