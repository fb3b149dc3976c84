//! In-memory repository implementation for testing and local development

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::{ProgressError, ProgressResult};
use crate::model::{
    NewQuestion, NewUser, ProgressChange, ProgressEntry, ProgressFilter, ProgressRecord, Question,
    QuestionFilter, QuestionSummary, User,
};
use crate::repository::{ProgressRepository, QuestionRepository, UserRepository};
use crate::validation::{validate_question, validate_username};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    questions: HashMap<Uuid, Question>,
    progress: HashMap<(Uuid, Uuid), ProgressRecord>,
}

/// All three tables behind one lock, so every change is atomic
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ProgressResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|e| ProgressError::Storage(e.to_string()))
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn create_user(&self, new_user: NewUser) -> ProgressResult<User> {
        validate_username(&new_user.username)?;
        let user = new_user.into_user(Utc::now());

        let mut tables = self.lock()?;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(ProgressError::Conflict(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> ProgressResult<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn create_question(&self, new_question: NewQuestion) -> ProgressResult<Question> {
        validate_question(&new_question)?;
        let question = new_question.into_question(Utc::now());
        self.lock()?
            .questions
            .insert(question.id, question.clone());
        Ok(question)
    }

    async fn find_question(&self, id: Uuid) -> ProgressResult<Option<Question>> {
        Ok(self.lock()?.questions.get(&id).cloned())
    }

    async fn list_questions(&self, filter: &QuestionFilter) -> ProgressResult<(Vec<Question>, i64)> {
        let tables = self.lock()?;
        let mut matching: Vec<&Question> = tables
            .questions
            .values()
            .filter(|q| q.matches(filter))
            .collect();
        matching.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit() as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn find_progress(
        &self,
        user_id: Uuid,
        question_id: Uuid,
    ) -> ProgressResult<Option<ProgressRecord>> {
        Ok(self.lock()?.progress.get(&(user_id, question_id)).cloned())
    }

    async fn apply_change(
        &self,
        user_id: Uuid,
        question_id: Uuid,
        change: &ProgressChange,
        now: DateTime<Utc>,
    ) -> ProgressResult<ProgressRecord> {
        let mut tables = self.lock()?;

        if !tables.users.contains_key(&user_id) {
            return Err(ProgressError::not_found(format!("User {} not found", user_id)));
        }
        if !tables.questions.contains_key(&question_id) {
            return Err(ProgressError::not_found(format!(
                "Question {} not found",
                question_id
            )));
        }

        let current = tables.progress.get(&(user_id, question_id)).cloned();
        let updated = change.apply(user_id, question_id, current, now)?;
        tables
            .progress
            .insert((user_id, question_id), updated.clone());
        Ok(updated)
    }

    async fn list_progress(
        &self,
        user_id: Uuid,
        filter: &ProgressFilter,
    ) -> ProgressResult<Vec<ProgressEntry>> {
        let tables = self.lock()?;

        let mut entries: Vec<ProgressEntry> = tables
            .progress
            .values()
            .filter(|p| p.user_id == user_id)
            .filter_map(|p| {
                let question = tables.questions.get(&p.question_id)?;
                Some(ProgressEntry {
                    progress: p.clone(),
                    question: QuestionSummary {
                        title: question.title.clone(),
                        category: question.category,
                        difficulty: question.difficulty,
                    },
                })
            })
            .filter(|entry| filter.matches(entry))
            .collect();

        entries.sort_by(|a, b| {
            b.progress
                .last_attempt_date
                .cmp(&a.progress.last_attempt_date)
                .then(a.progress.id.cmp(&b.progress.id))
        });
        Ok(entries)
    }
}
