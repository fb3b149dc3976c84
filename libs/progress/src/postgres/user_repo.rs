use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::PgRepository;
use crate::error::{ProgressError, ProgressResult};
use crate::model::{NewUser, User};
use crate::repository::UserRepository;
use crate::validation::validate_username;

#[async_trait]
impl UserRepository for PgRepository {
    async fn create_user(&self, new_user: NewUser) -> ProgressResult<User> {
        validate_username(&new_user.username)?;
        let user = new_user.into_user(Utc::now());
        info!("Creating new user: {}", user.username);

        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, username, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                ProgressError::Conflict(format!("Username '{}' is already taken", user.username)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, id: Uuid) -> ProgressResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
