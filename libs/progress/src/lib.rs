//! Progress tracking core for the QF interview tool
//!
//! This crate owns the domain of the practice backend: users, the curated
//! question catalog and per-user progress. It defines the rules for how a
//! progress row evolves, the repository contracts, and two backends
//! (PostgreSQL and in-memory) that enforce referential integrity and apply
//! changes atomically per (user, question) pair.
//!
//! ```rust,no_run
//! use progress::{Outcome, ProgressTracker, Storage};
//!
//! # async fn demo(pool: sqlx::PgPool, user: uuid::Uuid, question: uuid::Uuid) -> progress::ProgressResult<()> {
//! let storage = Storage::postgres(pool);
//! let tracker = ProgressTracker::new(&storage);
//! let row = tracker.record_attempt(user, question, 30, Outcome::Incorrect).await?;
//! assert_eq!(row.attempts, 1);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod repository;
pub mod tracker;
pub mod validation;

pub use catalog::{CatalogMetadata, QuestionCatalog};
pub use error::{ProgressError, ProgressResult};
pub use model::{
    Category, CategoryProgress, Difficulty, NewQuestion, NewUser, Outcome, ProgressChange,
    ProgressEntry, ProgressFilter, ProgressRecord, ProgressStatus, ProgressSummary, Question,
    QuestionFilter, QuestionPage, QuestionSummary, User,
};
pub use repository::{ProgressRepository, QuestionRepository, Storage, UserRepository};
pub use tracker::ProgressTracker;
