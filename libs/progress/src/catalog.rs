//! Question catalog: the read path over curated practice questions, plus
//! the administrative import used to seed it

use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::{ProgressError, ProgressResult};
use crate::model::{Category, Difficulty, NewQuestion, Question, QuestionFilter, QuestionPage};
use crate::repository::{QuestionRepository, Storage};

/// Values the catalog can be filtered by
#[derive(Debug, Clone, Serialize)]
pub struct CatalogMetadata {
    pub categories: Vec<Category>,
    pub difficulties: Vec<Difficulty>,
}

/// Question catalog service
#[derive(Clone)]
pub struct QuestionCatalog {
    questions: Arc<dyn QuestionRepository>,
}

impl QuestionCatalog {
    pub fn new(storage: &Storage) -> Self {
        Self {
            questions: storage.questions.clone(),
        }
    }

    /// One page of questions matching `filter`
    pub async fn list(&self, filter: &QuestionFilter) -> ProgressResult<QuestionPage> {
        let (items, total) = self.questions.list_questions(filter).await?;
        Ok(QuestionPage {
            items,
            page: filter.page(),
            limit: filter.limit(),
            total,
        })
    }

    pub async fn get(&self, id: Uuid) -> ProgressResult<Question> {
        self.questions
            .find_question(id)
            .await?
            .ok_or_else(|| ProgressError::not_found(format!("Question {} not found", id)))
    }

    pub fn metadata(&self) -> CatalogMetadata {
        CatalogMetadata {
            categories: Category::ALL.to_vec(),
            difficulties: Difficulty::ALL.to_vec(),
        }
    }

    /// Whether the catalog holds no questions at all
    pub async fn is_empty(&self) -> ProgressResult<bool> {
        let probe = QuestionFilter {
            limit: Some(1),
            ..Default::default()
        };
        let (_, total) = self.questions.list_questions(&probe).await?;
        Ok(total == 0)
    }

    /// Insert a batch of curated questions. Stops at the first invalid
    /// question; earlier questions of the batch stay imported.
    pub async fn import(&self, questions: Vec<NewQuestion>) -> ProgressResult<Vec<Question>> {
        let mut imported = Vec::with_capacity(questions.len());
        for question in questions {
            imported.push(self.questions.create_question(question).await?);
        }
        info!(count = imported.len(), "Imported catalog questions");
        Ok(imported)
    }
}
