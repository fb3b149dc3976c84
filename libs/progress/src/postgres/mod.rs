//! PostgreSQL repository implementation

use sqlx::PgPool;

use common::error::DatabaseResult;

mod migrate;
mod progress_repo;
mod question_repo;
mod user_repo;

/// Repository over a shared PostgreSQL pool
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    /// Create a new repository over an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create or upgrade the schema
    pub async fn migrate(&self) -> DatabaseResult<()> {
        migrate::run_migrations(&self.pool).await
    }
}
