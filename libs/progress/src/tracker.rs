//! Progress tracker: the single entry point for reading and changing a
//! user's history with catalog questions

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ProgressError, ProgressResult};
use crate::model::{
    Outcome, ProgressChange, ProgressEntry, ProgressFilter, ProgressRecord, ProgressSummary,
};
use crate::repository::{ProgressRepository, Storage, UserRepository};

/// Progress tracker service
#[derive(Clone)]
pub struct ProgressTracker {
    users: Arc<dyn UserRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressTracker {
    pub fn new(storage: &Storage) -> Self {
        Self {
            users: storage.users.clone(),
            progress: storage.progress.clone(),
        }
    }

    /// Record one attempt, creating the progress row on first contact.
    ///
    /// # Errors
    ///
    /// `Validation` for a negative `elapsed_seconds` (nothing is written),
    /// `NotFound` for an unknown user or question.
    pub async fn record_attempt(
        &self,
        user_id: Uuid,
        question_id: Uuid,
        elapsed_seconds: i64,
        outcome: Outcome,
    ) -> ProgressResult<ProgressRecord> {
        let change = ProgressChange::Attempt {
            elapsed_seconds,
            outcome,
        };
        if let Err(e) = change.validate() {
            warn!(%user_id, %question_id, elapsed_seconds, "Rejected attempt: {}", e);
            return Err(e);
        }

        let record = self
            .progress
            .apply_change(user_id, question_id, &change, Utc::now())
            .await?;

        info!(
            %user_id,
            %question_id,
            attempts = record.attempts,
            status = %record.status,
            "Recorded attempt"
        );
        Ok(record)
    }

    /// Add or remove the bookmark on a question.
    ///
    /// Bookmarking an untouched question creates its row. Removing a
    /// bookmark restores the status the row had before it was bookmarked.
    ///
    /// # Errors
    ///
    /// `NotFound` when removing a bookmark from a pair without progress, or
    /// for an unknown user or question.
    pub async fn set_bookmark(
        &self,
        user_id: Uuid,
        question_id: Uuid,
        bookmarked: bool,
    ) -> ProgressResult<ProgressRecord> {
        let record = self
            .progress
            .apply_change(
                user_id,
                question_id,
                &ProgressChange::Bookmark(bookmarked),
                Utc::now(),
            )
            .await?;

        info!(%user_id, %question_id, bookmarked, status = %record.status, "Updated bookmark");
        Ok(record)
    }

    /// Replace the free-text notes of an existing progress row
    pub async fn set_notes(
        &self,
        user_id: Uuid,
        question_id: Uuid,
        notes: Option<String>,
    ) -> ProgressResult<ProgressRecord> {
        self.progress
            .apply_change(user_id, question_id, &ProgressChange::Notes(notes), Utc::now())
            .await
    }

    /// Progress for one pair; `None` means no progress yet, whatever the
    /// reason, including ids that do not exist.
    pub async fn get_progress(
        &self,
        user_id: Uuid,
        question_id: Uuid,
    ) -> ProgressResult<Option<ProgressRecord>> {
        self.progress.find_progress(user_id, question_id).await
    }

    /// Every progress row of a user with question metadata, most recently
    /// attempted first.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user.
    pub async fn list_progress(
        &self,
        user_id: Uuid,
        filter: &ProgressFilter,
    ) -> ProgressResult<Vec<ProgressEntry>> {
        self.ensure_user(user_id).await?;
        self.progress.list_progress(user_id, filter).await
    }

    /// Aggregate counters over every progress row of a user
    pub async fn summary(&self, user_id: Uuid) -> ProgressResult<ProgressSummary> {
        let entries = self.list_progress(user_id, &ProgressFilter::default()).await?;
        Ok(ProgressSummary::from_entries(user_id, &entries))
    }

    async fn ensure_user(&self, user_id: Uuid) -> ProgressResult<()> {
        match self.users.find_user(user_id).await? {
            Some(_) => Ok(()),
            None => Err(ProgressError::not_found(format!("User {} not found", user_id))),
        }
    }
}
