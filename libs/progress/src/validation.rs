//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{ProgressError, ProgressResult};
use crate::model::NewQuestion;

/// Validate username
pub fn validate_username(username: &str) -> ProgressResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ProgressError::validation("Username is required"));
    }

    if username.len() < 3 {
        return Err(ProgressError::validation(
            "Username must be at least 3 characters long",
        ));
    }

    if username.len() > 32 {
        return Err(ProgressError::validation(
            "Username must be at most 32 characters long",
        ));
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err(ProgressError::validation(
            "Username can only contain letters, numbers, and underscores",
        ));
    }

    Ok(())
}

/// Validate a question before it enters the catalog
pub fn validate_question(question: &NewQuestion) -> ProgressResult<()> {
    for (field, value) in [
        ("title", &question.title),
        ("content", &question.content),
        ("solution", &question.solution),
    ] {
        if value.trim().is_empty() {
            return Err(ProgressError::validation(format!(
                "Question {} must not be empty",
                field
            )));
        }
    }

    if question.title.trim().len() > 255 {
        return Err(ProgressError::validation(
            "Question title must be at most 255 characters long",
        ));
    }

    if question.hints.iter().any(|hint| hint.trim().is_empty()) {
        return Err(ProgressError::validation("Question hints must not be empty"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Difficulty};

    fn question() -> NewQuestion {
        NewQuestion {
            title: "Gambler's ruin".to_string(),
            content: "Start with $1, bet $1 on a fair coin...".to_string(),
            category: Category::StochasticProcesses,
            difficulty: Difficulty::Medium,
            solution: "Martingale argument".to_string(),
            hints: vec![],
            tags: vec![],
            company_tags: vec![],
        }
    }

    #[test]
    fn usernames() {
        assert!(validate_username("quant_42").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username("no spaces").is_err());
        assert!(validate_username("dash-es").is_err());
    }

    #[test]
    fn questions_need_text_fields() {
        assert!(validate_question(&question()).is_ok());

        let mut q = question();
        q.solution = "   ".to_string();
        let err = validate_question(&q).unwrap_err();
        assert_eq!(err.to_string(), "Question solution must not be empty");

        let mut q = question();
        q.hints = vec!["".to_string()];
        assert!(validate_question(&q).is_err());

        let mut q = question();
        q.title = "x".repeat(256);
        assert!(validate_question(&q).is_err());
    }
}
