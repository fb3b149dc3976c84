//! Repository contracts for the entity store
//!
//! Two adapters implement these traits: [`crate::postgres::PgRepository`]
//! for production and [`crate::memory::InMemoryRepository`] for tests and
//! local development. Both reject progress rows that reference an unknown
//! user or question, and both apply a [`ProgressChange`] atomically per
//! (user, question) pair.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ProgressResult;
use crate::memory::InMemoryRepository;
use crate::model::{
    NewQuestion, NewUser, ProgressChange, ProgressEntry, ProgressFilter, ProgressRecord, Question,
    QuestionFilter, User,
};
use crate::postgres::PgRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Conflict` if the username is taken.
    async fn create_user(&self, new_user: NewUser) -> ProgressResult<User>;

    /// Fetch a user by ID.
    async fn find_user(&self, id: Uuid) -> ProgressResult<Option<User>>;
}

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Persist a new catalog question.
    async fn create_question(&self, new_question: NewQuestion) -> ProgressResult<Question>;

    /// Fetch a question by ID.
    async fn find_question(&self, id: Uuid) -> ProgressResult<Option<Question>>;

    /// Fetch one page of questions matching `filter`, ordered by title, along
    /// with the total number of matches.
    async fn list_questions(&self, filter: &QuestionFilter) -> ProgressResult<(Vec<Question>, i64)>;
}

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the progress row for a pair, if any.
    async fn find_progress(
        &self,
        user_id: Uuid,
        question_id: Uuid,
    ) -> ProgressResult<Option<ProgressRecord>>;

    /// Read the current row for the pair, apply `change` and write the
    /// result back as one atomic step. Concurrent calls for the same pair
    /// are serialized; calls for different pairs do not block each other.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NotFound` if the user or question is unknown,
    /// or whatever `ProgressChange::apply` rejects.
    async fn apply_change(
        &self,
        user_id: Uuid,
        question_id: Uuid,
        change: &ProgressChange,
        now: DateTime<Utc>,
    ) -> ProgressResult<ProgressRecord>;

    /// All progress rows of a user joined with question metadata, most
    /// recently attempted first.
    async fn list_progress(
        &self,
        user_id: Uuid,
        filter: &ProgressFilter,
    ) -> ProgressResult<Vec<ProgressEntry>>;
}

/// Bundle of repositories sharing one backend
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            users: Arc::new(repo.clone()),
            questions: Arc::new(repo.clone()),
            progress: Arc::new(repo),
        }
    }

    /// Storage over an already initialised pool; the caller owns the pool
    /// lifetime and closes it on shutdown.
    pub fn postgres(pool: PgPool) -> Self {
        let repo = PgRepository::new(pool);
        Self {
            users: Arc::new(repo.clone()),
            questions: Arc::new(repo.clone()),
            progress: Arc::new(repo),
        }
    }
}
