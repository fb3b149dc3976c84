//! User progress model and the rules that govern how a progress row changes
//!
//! A progress row summarises one user's history with one question. Every
//! mutation goes through [`ProgressChange::apply`], which is pure: the
//! repositories read the current row under a lock, hand it to `apply`, and
//! persist whatever comes back. Keeping the rules here means the PostgreSQL
//! and in-memory stores cannot drift apart.
//!
//! Rules enforced by `apply`:
//! - `attempts` never decreases and is at least 1; a row created by a
//!   bookmark holds a placeholder attempt that the first real attempt
//!   consumes, so `attempts` counts recorded attempts
//! - `time_spent` never decreases
//! - an attempt promotes `attempted` to `solved` on a correct outcome and
//!   never demotes `solved`
//! - bookmarking remembers the underlying status, unbookmarking restores it
//! - `last_attempt_date` never moves backwards

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::error::{ProgressError, ProgressResult};
use crate::model::question::{Category, Difficulty};

/// Progress status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "progress_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Attempted,
    Solved,
    Bookmarked,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::Attempted => "attempted",
            ProgressStatus::Solved => "solved",
            ProgressStatus::Bookmarked => "bookmarked",
        }
    }

    /// Status after an attempt with `outcome`; solved is sticky
    fn promote(self, outcome: Outcome) -> Self {
        match (self, outcome) {
            (ProgressStatus::Solved, _) | (_, Outcome::Correct) => ProgressStatus::Solved,
            _ => ProgressStatus::Attempted,
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Incorrect,
}

impl Outcome {
    fn status(self) -> ProgressStatus {
        match self {
            Outcome::Correct => ProgressStatus::Solved,
            Outcome::Incorrect => ProgressStatus::Attempted,
        }
    }
}

/// Progress entity, one per (user, question) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question_id: Uuid,
    pub status: ProgressStatus,
    /// Status to restore when a bookmark is removed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_before_bookmark: Option<ProgressStatus>,
    /// Set while `attempts` holds the schema-default 1 of a row that was
    /// bookmarked before any attempt. Survives bookmark toggles.
    #[serde(skip)]
    pub placeholder_attempt: bool,
    /// Seconds spent across all attempts
    pub time_spent: i64,
    pub attempts: i32,
    pub last_attempt_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    fn fresh(user_id: Uuid, question_id: Uuid, status: ProgressStatus, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            question_id,
            status,
            status_before_bookmark: None,
            placeholder_attempt: false,
            time_spent: 0,
            attempts: 1,
            last_attempt_date: now,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of attempts actually recorded
    pub fn recorded_attempts(&self) -> i32 {
        if self.placeholder_attempt {
            0
        } else {
            self.attempts
        }
    }

    pub fn is_bookmarked(&self) -> bool {
        self.status == ProgressStatus::Bookmarked
    }

    /// Status the row reports once bookmarks are ignored
    pub fn underlying_status(&self) -> ProgressStatus {
        if self.is_bookmarked() {
            self.status_before_bookmark
                .unwrap_or(ProgressStatus::Attempted)
        } else {
            self.status
        }
    }

    fn add_time(&mut self, elapsed_seconds: i64) -> ProgressResult<()> {
        self.time_spent = self
            .time_spent
            .checked_add(elapsed_seconds)
            .ok_or_else(|| ProgressError::validation("timeSpent would overflow"))?;
        Ok(())
    }
}

/// A requested mutation of one progress row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressChange {
    /// One attempt taking `elapsed_seconds` with the given outcome
    Attempt {
        elapsed_seconds: i64,
        outcome: Outcome,
    },
    /// Add or remove the bookmark
    Bookmark(bool),
    /// Replace the free-text notes
    Notes(Option<String>),
}

impl ProgressChange {
    /// Reject changes that are invalid regardless of the stored row
    pub fn validate(&self) -> ProgressResult<()> {
        match self {
            ProgressChange::Attempt {
                elapsed_seconds, ..
            } if *elapsed_seconds < 0 => Err(ProgressError::validation(format!(
                "elapsedSeconds must not be negative (got {})",
                elapsed_seconds
            ))),
            _ => Ok(()),
        }
    }

    /// Compute the row that results from applying this change to `current`.
    ///
    /// `current` is `None` when the pair has no row yet. The returned record
    /// is the complete new state; callers insert it when `current` was `None`
    /// and update otherwise.
    pub fn apply(
        &self,
        user_id: Uuid,
        question_id: Uuid,
        current: Option<ProgressRecord>,
        now: DateTime<Utc>,
    ) -> ProgressResult<ProgressRecord> {
        self.validate()?;

        match (self, current) {
            (
                ProgressChange::Attempt {
                    elapsed_seconds,
                    outcome,
                },
                None,
            ) => {
                let mut record = ProgressRecord::fresh(user_id, question_id, outcome.status(), now);
                record.time_spent = *elapsed_seconds;
                Ok(record)
            }
            (
                ProgressChange::Attempt {
                    elapsed_seconds,
                    outcome,
                },
                Some(mut record),
            ) => {
                record.add_time(*elapsed_seconds)?;

                if record.placeholder_attempt {
                    record.placeholder_attempt = false;
                } else {
                    record.attempts = next_attempt(record.attempts)?;
                }

                if record.is_bookmarked() {
                    record.status_before_bookmark =
                        Some(record.underlying_status().promote(*outcome));
                } else {
                    record.attempts = next_attempt(record.attempts)?;
                    record.status = record.status.promote(*outcome);
                }

                record.last_attempt_date = record.last_attempt_date.max(now);
                record.updated_at = now;
                Ok(record)
            }
            (ProgressChange::Bookmark(true), None) => {
                // last_attempt_date takes the creation time until a real attempt arrives.
                let mut record =
                    ProgressRecord::fresh(user_id, question_id, ProgressStatus::Bookmarked, now);
                record.placeholder_attempt = true;
                Ok(record)
            }
            (ProgressChange::Bookmark(false), None) | (ProgressChange::Notes(_), None) => {
                Err(ProgressError::not_found(format!(
                    "No progress recorded for user {} on question {}",
                    user_id, question_id
                )))
            }
            (ProgressChange::Bookmark(bookmarked), Some(mut record)) => {
                if *bookmarked == record.is_bookmarked() {
                    return Ok(record);
                }
                if *bookmarked {
                    record.status_before_bookmark = Some(record.status);
                    record.status = ProgressStatus::Bookmarked;
                } else {
                    record.status = record.underlying_status();
                    record.status_before_bookmark = None;
                }
                record.updated_at = now;
                Ok(record)
            }
            (ProgressChange::Notes(notes), Some(mut record)) => {
                record.notes = notes
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string);
                record.updated_at = now;
                Ok(record)
            }
        }
    }
}

fn next_attempt(attempts: i32) -> ProgressResult<i32> {
    attempts
        .checked_add(1)
        .ok_or_else(|| ProgressError::validation("attempts would overflow"))
}

/// Question metadata joined onto a progress row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSummary {
    pub title: String,
    pub category: Category,
    pub difficulty: Difficulty,
}

/// Progress row joined with the question it refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    #[serde(flatten)]
    pub progress: ProgressRecord,
    pub question: QuestionSummary,
}

/// Filters for listing a user's progress. `status` compares the stored
/// status, so a bookmarked row only matches `bookmarked` whatever lies
/// underneath; [`ProgressSummary`] counts such rows as solved as well.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressFilter {
    pub status: Option<ProgressStatus>,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
}

impl ProgressFilter {
    pub fn matches(&self, entry: &ProgressEntry) -> bool {
        self.status.is_none_or(|s| s == entry.progress.status)
            && self.category.is_none_or(|c| c == entry.question.category)
            && self.difficulty.is_none_or(|d| d == entry.question.difficulty)
    }
}

/// Per-category counters in a progress summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProgress {
    pub touched: u32,
    pub solved: u32,
}

/// Aggregate view of a user's progress
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub user_id: Uuid,
    pub questions: u32,
    pub attempted: u32,
    pub solved: u32,
    pub bookmarked: u32,
    pub total_attempts: i64,
    pub total_time_spent: i64,
    pub by_category: BTreeMap<Category, CategoryProgress>,
}

impl ProgressSummary {
    /// Fold progress entries into counters. Bookmarked rows count towards
    /// `bookmarked` and, through their underlying status, towards `solved`.
    pub fn from_entries(user_id: Uuid, entries: &[ProgressEntry]) -> Self {
        let mut summary = ProgressSummary {
            user_id,
            ..Default::default()
        };

        for entry in entries {
            let record = &entry.progress;
            let solved = record.underlying_status() == ProgressStatus::Solved;

            summary.questions += 1;
            summary.total_attempts += i64::from(record.recorded_attempts());
            summary.total_time_spent = summary.total_time_spent.saturating_add(record.time_spent);
            match record.status {
                ProgressStatus::Attempted => summary.attempted += 1,
                ProgressStatus::Solved => summary.solved += 1,
                ProgressStatus::Bookmarked => {
                    summary.bookmarked += 1;
                    if solved {
                        summary.solved += 1;
                    }
                }
            }

            let category = summary.by_category.entry(entry.question.category).or_default();
            category.touched += 1;
            if solved {
                category.solved += 1;
            }
        }

        summary
    }
}
