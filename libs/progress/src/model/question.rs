//! Catalog question model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Default number of questions per catalog page
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Largest page a caller may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Question category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "question_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Probability,
    Statistics,
    StochasticProcesses,
    BrainTeasers,
    FinancialConcepts,
    CodingChallenges,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Probability,
        Category::Statistics,
        Category::StochasticProcesses,
        Category::BrainTeasers,
        Category::FinancialConcepts,
        Category::CodingChallenges,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Probability => "probability",
            Category::Statistics => "statistics",
            Category::StochasticProcesses => "stochastic_processes",
            Category::BrainTeasers => "brain_teasers",
            Category::FinancialConcepts => "financial_concepts",
            Category::CodingChallenges => "coding_challenges",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Question difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "question_difficulty", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Question entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub solution: String,
    pub hints: Vec<String>,
    pub tags: Vec<String>,
    pub company_tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Question {
    /// Whether this question passes every criterion of `filter` (paging ignored)
    pub fn matches(&self, filter: &QuestionFilter) -> bool {
        filter.category.is_none_or(|c| c == self.category)
            && filter.difficulty.is_none_or(|d| d == self.difficulty)
            && filter
                .tag
                .as_deref()
                .is_none_or(|tag| self.tags.iter().any(|t| t == tag))
            && filter
                .company
                .as_deref()
                .is_none_or(|company| self.company_tags.iter().any(|c| c == company))
    }
}

/// New question payload, as produced by the administrative import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestion {
    pub title: String,
    pub content: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub solution: String,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub company_tags: Vec<String>,
}

impl NewQuestion {
    /// Build the stored entity. Tag lists are treated as sets: trimmed,
    /// emptied entries dropped and duplicates removed in first-seen order.
    pub fn into_question(self, now: DateTime<Utc>) -> Question {
        Question {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            content: self.content,
            category: self.category,
            difficulty: self.difficulty,
            solution: self.solution,
            hints: self.hints,
            tags: dedupe_tags(self.tags),
            company_tags: dedupe_tags(self.company_tags),
            created_at: now,
            updated_at: now,
        }
    }
}

fn dedupe_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Query parameters for catalog listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionFilter {
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    /// Only questions carrying this tag
    pub tag: Option<String>,
    /// Only questions asked by this company
    pub company: Option<String>,
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
}

impl QuestionFilter {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.limit())
    }
}

/// One page of catalog questions
#[derive(Debug, Clone, Serialize)]
pub struct QuestionPage {
    pub items: Vec<Question>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewQuestion {
        NewQuestion {
            title: "  Two dice  ".to_string(),
            content: "Probability the sum is 7?".to_string(),
            category: Category::Probability,
            difficulty: Difficulty::Easy,
            solution: "1/6".to_string(),
            hints: vec!["Count outcomes".to_string()],
            tags: vec!["dice".into(), " dice ".into(), "".into(), "counting".into()],
            company_tags: vec!["Jane Street".into(), "Jane Street".into()],
        }
    }

    #[test]
    fn tag_lists_behave_like_sets() {
        let q = sample().into_question(Utc::now());
        assert_eq!(q.title, "Two dice");
        assert_eq!(q.tags, vec!["dice".to_string(), "counting".to_string()]);
        assert_eq!(q.company_tags, vec!["Jane Street".to_string()]);
        assert_eq!(q.hints, vec!["Count outcomes".to_string()]);
    }

    #[test]
    fn filter_matches_every_criterion() {
        let q = sample().into_question(Utc::now());

        assert!(q.matches(&QuestionFilter::default()));
        assert!(q.matches(&QuestionFilter {
            category: Some(Category::Probability),
            difficulty: Some(Difficulty::Easy),
            tag: Some("counting".into()),
            company: Some("Jane Street".into()),
            ..Default::default()
        }));
        assert!(!q.matches(&QuestionFilter {
            difficulty: Some(Difficulty::Hard),
            ..Default::default()
        }));
        assert!(!q.matches(&QuestionFilter {
            tag: Some("options".into()),
            ..Default::default()
        }));
    }

    #[test]
    fn paging_is_clamped() {
        let filter = QuestionFilter {
            page: Some(0),
            limit: Some(1000),
            ..Default::default()
        };
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.limit(), MAX_PAGE_SIZE);
        assert_eq!(filter.offset(), 0);

        let filter = QuestionFilter {
            page: Some(3),
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(filter.limit(), 1);
        assert_eq!(filter.offset(), 2);
    }

    #[test]
    fn enums_use_wire_names() {
        assert_eq!(
            serde_json::to_string(&Category::StochasticProcesses).unwrap(),
            "\"stochastic_processes\""
        );
        let d: Difficulty = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(d, Difficulty::Medium);
        assert!(serde_json::from_str::<Difficulty>("\"extreme\"").is_err());
        assert!(Category::ALL.iter().all(|c| c.to_string() == c.as_str()));
    }
}
