use sqlx::PgPool;
use tracing::info;

use common::error::{DatabaseError, DatabaseResult};

/// Arbitrary key for the advisory lock that keeps concurrent startups from
/// racing through the same migration.
const MIGRATION_LOCK_KEY: i64 = 0x5146_5f50_524f_4752;

/// Version 1: users, questions and user progress with explicit foreign keys
/// and one progress row per (user, question) pair.
const V1_SCHEMA: &[&str] = &[
    r"
    CREATE TYPE question_category AS ENUM (
        'probability',
        'statistics',
        'stochastic_processes',
        'brain_teasers',
        'financial_concepts',
        'coding_challenges'
    )
    ",
    r"CREATE TYPE question_difficulty AS ENUM ('easy', 'medium', 'hard')",
    r"CREATE TYPE progress_status AS ENUM ('attempted', 'solved', 'bookmarked')",
    r"
    CREATE TABLE users (
        id UUID PRIMARY KEY,
        username TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT users_username_key UNIQUE (username)
    )
    ",
    r"
    CREATE TABLE questions (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL CHECK (btrim(title) <> ''),
        content TEXT NOT NULL CHECK (btrim(content) <> ''),
        category question_category NOT NULL,
        difficulty question_difficulty NOT NULL,
        solution TEXT NOT NULL CHECK (btrim(solution) <> ''),
        hints TEXT[] NOT NULL DEFAULT '{}',
        tags TEXT[] NOT NULL DEFAULT '{}',
        company_tags TEXT[] NOT NULL DEFAULT '{}',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    ",
    r"CREATE INDEX questions_category_difficulty_idx ON questions (category, difficulty)",
    r"
    CREATE TABLE user_progress (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES users (id),
        question_id UUID NOT NULL REFERENCES questions (id),
        status progress_status NOT NULL,
        status_before_bookmark progress_status
            CHECK (status_before_bookmark IS NULL OR status_before_bookmark <> 'bookmarked'),
        time_spent BIGINT NOT NULL DEFAULT 0 CHECK (time_spent >= 0),
        attempts INTEGER NOT NULL DEFAULT 1 CHECK (attempts >= 1),
        last_attempt_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT user_progress_user_question_key UNIQUE (user_id, question_id)
    )
    ",
    r"
    CREATE INDEX user_progress_user_last_attempt_idx
        ON user_progress (user_id, last_attempt_date DESC)
    ",
];

/// Version 2: rows created by a bookmark carry a placeholder attempt until
/// the first real attempt is recorded.
const V2_PLACEHOLDER_ATTEMPT: &[&str] = &[r"
    ALTER TABLE user_progress
        ADD COLUMN placeholder_attempt BOOLEAN NOT NULL DEFAULT FALSE
    "];

const MIGRATIONS: &[(i64, &str, &[&str])] = &[
    (1, "initial schema", V1_SCHEMA),
    (2, "placeholder attempt flag", V2_PLACEHOLDER_ATTEMPT),
];

/// Runs every migration that has not been recorded in `schema_migrations`.
///
/// Each version is applied in its own transaction together with its
/// bookkeeping row, so a failed migration leaves no partial schema behind.
pub async fn run_migrations(pool: &PgPool) -> DatabaseResult<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version BIGINT PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        ",
    )
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::migration("schema_migrations", e))?;

    for (version, description, statements) in MIGRATIONS {
        let mut tx = pool
            .begin()
            .await
            .map_err(DatabaseError::Connection)?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(MIGRATION_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::migration("advisory lock", e))?;

        let applied: Option<i64> =
            sqlx::query_scalar("SELECT version FROM schema_migrations WHERE version = $1")
                .bind(*version)
                .fetch_optional(&mut *tx)
                .await
                .map_err(DatabaseError::Query)?;

        if applied.is_some() {
            continue;
        }

        for statement in *statements {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| DatabaseError::migration(description, e))?;
        }

        sqlx::query("INSERT INTO schema_migrations (version, description) VALUES ($1, $2)")
            .bind(*version)
            .bind(*description)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?;

        tx.commit().await.map_err(DatabaseError::Query)?;
        info!(version, description, "Applied schema migration");
    }

    Ok(())
}
