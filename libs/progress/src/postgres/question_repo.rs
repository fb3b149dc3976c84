use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::PgRepository;
use crate::error::ProgressResult;
use crate::model::{NewQuestion, Question, QuestionFilter};
use crate::repository::QuestionRepository;
use crate::validation::validate_question;

const QUESTION_COLUMNS: &str = "id, title, content, category, difficulty, solution, \
                                hints, tags, company_tags, created_at, updated_at";

/// Shared by the page query and the count query; parameters $1..$4
const FILTER_CLAUSE: &str = r#"
    WHERE ($1::question_category IS NULL OR category = $1)
      AND ($2::question_difficulty IS NULL OR difficulty = $2)
      AND ($3::text IS NULL OR $3 = ANY(tags))
      AND ($4::text IS NULL OR $4 = ANY(company_tags))
"#;

#[async_trait]
impl QuestionRepository for PgRepository {
    async fn create_question(&self, new_question: NewQuestion) -> ProgressResult<Question> {
        validate_question(&new_question)?;
        let question = new_question.into_question(Utc::now());

        let stored = sqlx::query_as::<_, Question>(&format!(
            r#"
            INSERT INTO questions ({QUESTION_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {QUESTION_COLUMNS}
            "#
        ))
        .bind(question.id)
        .bind(&question.title)
        .bind(&question.content)
        .bind(question.category)
        .bind(question.difficulty)
        .bind(&question.solution)
        .bind(&question.hints)
        .bind(&question.tags)
        .bind(&question.company_tags)
        .bind(question.created_at)
        .bind(question.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn find_question(&self, id: Uuid) -> ProgressResult<Option<Question>> {
        let question = sqlx::query_as::<_, Question>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(question)
    }

    async fn list_questions(&self, filter: &QuestionFilter) -> ProgressResult<(Vec<Question>, i64)> {
        let questions = sqlx::query_as::<_, Question>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions {FILTER_CLAUSE} \
             ORDER BY title, id LIMIT $5 OFFSET $6"
        ))
        .bind(filter.category)
        .bind(filter.difficulty)
        .bind(filter.tag.as_deref())
        .bind(filter.company.as_deref())
        .bind(i64::from(filter.limit()))
        .bind(filter.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM questions {FILTER_CLAUSE}"))
            .bind(filter.category)
            .bind(filter.difficulty)
            .bind(filter.tag.as_deref())
            .bind(filter.company.as_deref())
            .fetch_one(&self.pool)
            .await?;

        Ok((questions, total))
    }
}
