//! Integration tests for the database infrastructure
//!
//! These tests need a reachable PostgreSQL instance configured through
//! `DATABASE_URL`; run them with `cargo test -- --ignored`.

use common::database::{DatabaseConfig, health_check, init_pool};
use sqlx::Row;

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_database_pool_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1, "PostgreSQL simple query test failed");

    pool.close().await;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_exhausted_pool_times_out() -> Result<(), Box<dyn std::error::Error>> {
    let mut db_config = DatabaseConfig::from_env()?;
    db_config.max_connections = 1;
    db_config.min_connections = 0;
    db_config.connection_timeout = 1;
    let pool = init_pool(&db_config).await?;

    let held = pool.acquire().await?;
    let err = pool.acquire().await.unwrap_err();
    assert!(matches!(err, sqlx::Error::PoolTimedOut));

    drop(held);
    pool.close().await;
    Ok(())
}
