//! Progress tracker behaviour against PostgreSQL
//!
//! These tests need a reachable database configured through `DATABASE_URL`;
//! run them with `cargo test -- --ignored`. Every test creates its own users
//! and questions, so they can share one database.

mod support;

use common::database::{DatabaseConfig, init_pool};
use progress::{
    Category, Difficulty, Outcome, ProgressError, ProgressFilter, ProgressStatus, ProgressTracker,
    QuestionCatalog, QuestionFilter, Storage, postgres::PgRepository,
};
use uuid::Uuid;

async fn setup() -> anyhow::Result<(Storage, ProgressTracker)> {
    let mut config = DatabaseConfig::from_env()?;
    config.max_connections = config.max_connections.max(8);
    let pool = init_pool(&config).await?;
    PgRepository::new(pool.clone()).migrate().await?;

    let storage = Storage::postgres(pool);
    let tracker = ProgressTracker::new(&storage);
    Ok((storage, tracker))
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn migrations_are_idempotent() -> anyhow::Result<()> {
    let config = DatabaseConfig::from_env()?;
    let pool = init_pool(&config).await?;
    let repo = PgRepository::new(pool);
    repo.migrate().await?;
    repo.migrate().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn attempts_accumulate_and_promote() -> anyhow::Result<()> {
    let (storage, tracker) = setup().await?;
    let user = support::user(&storage).await;
    let question = support::question(&storage, Category::Probability, Difficulty::Easy).await;

    tracker
        .record_attempt(user.id, question.id, 30, Outcome::Incorrect)
        .await?;
    let row = tracker
        .record_attempt(user.id, question.id, 45, Outcome::Correct)
        .await?;

    assert_eq!(row.attempts, 2);
    assert_eq!(row.time_spent, 75);
    assert_eq!(row.status, ProgressStatus::Solved);

    let stored = tracker
        .get_progress(user.id, question.id)
        .await?
        .expect("progress row");
    assert_eq!(stored.attempts, 2);
    assert_eq!(stored.time_spent, 75);
    assert_eq!(stored.status, ProgressStatus::Solved);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn foreign_keys_are_enforced() -> anyhow::Result<()> {
    let (storage, tracker) = setup().await?;
    let user = support::user(&storage).await;

    let err = tracker
        .record_attempt(user.id, Uuid::new_v4(), 10, Outcome::Correct)
        .await
        .unwrap_err();
    assert!(matches!(err, ProgressError::NotFound(_)));
    assert_eq!(tracker.get_progress(user.id, Uuid::new_v4()).await?, None);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn bookmark_round_trip_restores_status() -> anyhow::Result<()> {
    let (storage, tracker) = setup().await?;
    let user = support::user(&storage).await;
    let question = support::question(&storage, Category::BrainTeasers, Difficulty::Medium).await;

    tracker
        .record_attempt(user.id, question.id, 12, Outcome::Incorrect)
        .await?;
    tracker.set_bookmark(user.id, question.id, true).await?;
    tracker
        .record_attempt(user.id, question.id, 8, Outcome::Correct)
        .await?;

    let bookmarked = tracker
        .list_progress(
            user.id,
            &ProgressFilter {
                status: Some(ProgressStatus::Bookmarked),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(bookmarked.len(), 1);
    assert_eq!(bookmarked[0].question.title, question.title);

    let restored = tracker.set_bookmark(user.id, question.id, false).await?;
    assert_eq!(restored.status, ProgressStatus::Solved);
    assert_eq!(restored.attempts, 2);
    assert_eq!(restored.time_spent, 20);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn placeholder_attempt_survives_unbookmark() -> anyhow::Result<()> {
    let (storage, tracker) = setup().await?;
    let user = support::user(&storage).await;
    let question = support::question(&storage, Category::Statistics, Difficulty::Easy).await;

    tracker.set_bookmark(user.id, question.id, true).await?;
    tracker.set_bookmark(user.id, question.id, false).await?;
    tracker
        .record_attempt(user.id, question.id, 10, Outcome::Incorrect)
        .await?;

    let stored = tracker
        .get_progress(user.id, question.id)
        .await?
        .expect("progress row");
    assert_eq!(stored.attempts, 1);
    assert!(!stored.placeholder_attempt);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires a running PostgreSQL instance"]
async fn parallel_attempts_are_not_lost() -> anyhow::Result<()> {
    const N: i32 = 32;

    let (storage, tracker) = setup().await?;
    let user = support::user(&storage).await;
    let question = support::question(&storage, Category::StochasticProcesses, Difficulty::Hard).await;
    let (user_id, question_id) = (user.id, question.id);

    let mut handles = Vec::new();
    for _ in 0..N {
        let tracker = tracker.clone();
        handles.push(tokio::spawn(async move {
            tracker
                .record_attempt(user_id, question_id, 2, Outcome::Incorrect)
                .await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let row = tracker
        .get_progress(user_id, question_id)
        .await?
        .expect("progress row");
    assert_eq!(row.attempts, N);
    assert_eq!(row.time_spent, 2 * i64::from(N));
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn catalog_filters_by_tag() -> anyhow::Result<()> {
    let (storage, _) = setup().await?;
    let catalog = QuestionCatalog::new(&storage);
    let tag = format!("tag-{}", Uuid::new_v4());

    let mut tagged = support::new_question("Tagged", Category::Statistics, Difficulty::Easy);
    tagged.tags.push(tag.clone());
    catalog
        .import(vec![
            tagged,
            support::new_question("Untagged", Category::Statistics, Difficulty::Easy),
        ])
        .await?;

    let page = catalog
        .list(&QuestionFilter {
            tag: Some(tag),
            ..Default::default()
        })
        .await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].title, "Tagged");
    Ok(())
}
