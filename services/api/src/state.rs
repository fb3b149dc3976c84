//! Application state shared across handlers

use progress::{ProgressTracker, QuestionCatalog, Storage};
use sqlx::PgPool;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Present when running against PostgreSQL; used by the health check
    pub db_pool: Option<PgPool>,
    pub storage: Storage,
    pub tracker: ProgressTracker,
    pub catalog: QuestionCatalog,
}

impl AppState {
    pub fn new(storage: Storage, db_pool: Option<PgPool>) -> Self {
        Self {
            db_pool,
            tracker: ProgressTracker::new(&storage),
            catalog: QuestionCatalog::new(&storage),
            storage,
        }
    }
}
