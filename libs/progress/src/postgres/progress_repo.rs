use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, Row, Transaction};
use tracing::{debug, warn};
use uuid::Uuid;

use super::PgRepository;
use crate::error::{ProgressError, ProgressResult};
use crate::model::{
    ProgressChange, ProgressEntry, ProgressFilter, ProgressRecord, QuestionSummary,
};
use crate::repository::ProgressRepository;

const PROGRESS_COLUMNS: &str = "id, user_id, question_id, status, status_before_bookmark, \
                                placeholder_attempt, time_spent, attempts, last_attempt_date, \
                                notes, created_at, updated_at";

/// How many times a first insert may lose the race against a concurrent
/// insert for the same pair before the change is reported as a conflict.
const MAX_INSERT_RACES: u32 = 3;

async fn ensure_references(
    tx: &mut Transaction<'static, Postgres>,
    user_id: Uuid,
    question_id: Uuid,
) -> ProgressResult<()> {
    let (user_exists, question_exists): (bool, bool) = sqlx::query_as(
        r#"
        SELECT EXISTS (SELECT 1 FROM users WHERE id = $1),
               EXISTS (SELECT 1 FROM questions WHERE id = $2)
        "#,
    )
    .bind(user_id)
    .bind(question_id)
    .fetch_one(&mut **tx)
    .await?;

    if !user_exists {
        return Err(ProgressError::not_found(format!("User {} not found", user_id)));
    }
    if !question_exists {
        return Err(ProgressError::not_found(format!(
            "Question {} not found",
            question_id
        )));
    }
    Ok(())
}

async fn insert_record(
    tx: &mut Transaction<'static, Postgres>,
    record: &ProgressRecord,
) -> ProgressResult<bool> {
    let result = sqlx::query(&format!(
        r#"
        INSERT INTO user_progress ({PROGRESS_COLUMNS})
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (user_id, question_id) DO NOTHING
        "#
    ))
    .bind(record.id)
    .bind(record.user_id)
    .bind(record.question_id)
    .bind(record.status)
    .bind(record.status_before_bookmark)
    .bind(record.placeholder_attempt)
    .bind(record.time_spent)
    .bind(record.attempts)
    .bind(record.last_attempt_date)
    .bind(&record.notes)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() == 1)
}

async fn update_record(
    tx: &mut Transaction<'static, Postgres>,
    record: &ProgressRecord,
) -> ProgressResult<()> {
    sqlx::query(
        r#"
        UPDATE user_progress
        SET status = $2,
            status_before_bookmark = $3,
            placeholder_attempt = $4,
            time_spent = $5,
            attempts = $6,
            last_attempt_date = $7,
            notes = $8,
            updated_at = $9
        WHERE id = $1
        "#,
    )
    .bind(record.id)
    .bind(record.status)
    .bind(record.status_before_bookmark)
    .bind(record.placeholder_attempt)
    .bind(record.time_spent)
    .bind(record.attempts)
    .bind(record.last_attempt_date)
    .bind(&record.notes)
    .bind(record.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[async_trait]
impl ProgressRepository for PgRepository {
    async fn find_progress(
        &self,
        user_id: Uuid,
        question_id: Uuid,
    ) -> ProgressResult<Option<ProgressRecord>> {
        let record = sqlx::query_as::<_, ProgressRecord>(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM user_progress WHERE user_id = $1 AND question_id = $2"
        ))
        .bind(user_id)
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// The existing row is locked with `SELECT ... FOR UPDATE`, so writers
    /// for the same pair queue behind each other until commit. A missing row
    /// cannot be locked; the unique (user_id, question_id) constraint settles
    /// concurrent first inserts and the loser re-reads the winner's row.
    async fn apply_change(
        &self,
        user_id: Uuid,
        question_id: Uuid,
        change: &ProgressChange,
        now: DateTime<Utc>,
    ) -> ProgressResult<ProgressRecord> {
        change.validate()?;

        for race in 0..MAX_INSERT_RACES {
            let mut tx = self.pool.begin().await?;

            ensure_references(&mut tx, user_id, question_id).await?;

            let current = sqlx::query_as::<_, ProgressRecord>(&format!(
                "SELECT {PROGRESS_COLUMNS} FROM user_progress \
                 WHERE user_id = $1 AND question_id = $2 FOR UPDATE"
            ))
            .bind(user_id)
            .bind(question_id)
            .fetch_optional(&mut *tx)
            .await?;

            let is_new = current.is_none();
            let updated = change.apply(user_id, question_id, current, now)?;

            if is_new {
                if !insert_record(&mut tx, &updated).await? {
                    debug!(%user_id, %question_id, race, "Lost insert race, retrying");
                    tx.rollback().await?;
                    continue;
                }
            } else {
                update_record(&mut tx, &updated).await?;
            }

            tx.commit().await?;
            return Ok(updated);
        }

        warn!(%user_id, %question_id, "Progress insert kept conflicting");
        Err(ProgressError::Conflict(format!(
            "Concurrent updates for user {} on question {} did not settle",
            user_id, question_id
        )))
    }

    async fn list_progress(
        &self,
        user_id: Uuid,
        filter: &ProgressFilter,
    ) -> ProgressResult<Vec<ProgressEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.user_id, p.question_id, p.status, p.status_before_bookmark,
                   p.placeholder_attempt, p.time_spent, p.attempts, p.last_attempt_date, p.notes,
                   p.created_at, p.updated_at,
                   q.title, q.category, q.difficulty
            FROM user_progress p
            JOIN questions q ON q.id = p.question_id
            WHERE p.user_id = $1
              AND ($2::progress_status IS NULL OR p.status = $2)
              AND ($3::question_category IS NULL OR q.category = $3)
              AND ($4::question_difficulty IS NULL OR q.difficulty = $4)
            ORDER BY p.last_attempt_date DESC, p.id
            "#,
        )
        .bind(user_id)
        .bind(filter.status)
        .bind(filter.category)
        .bind(filter.difficulty)
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(ProgressEntry {
                progress: ProgressRecord::from_row(&row)?,
                question: QuestionSummary {
                    title: row.try_get("title")?,
                    category: row.try_get("category")?,
                    difficulty: row.try_get("difficulty")?,
                },
            });
        }

        Ok(entries)
    }
}
