//! Fixtures shared by the tracker integration tests

#![allow(dead_code)]

use progress::{Category, Difficulty, NewQuestion, NewUser, Question, Storage, User};
use uuid::Uuid;

pub async fn user(storage: &Storage) -> User {
    let name = format!("user_{}", &Uuid::new_v4().simple().to_string()[..12]);
    storage
        .users
        .create_user(NewUser::new(name))
        .await
        .expect("create user")
}

pub fn new_question(title: &str, category: Category, difficulty: Difficulty) -> NewQuestion {
    NewQuestion {
        title: title.to_string(),
        content: format!("{} - statement", title),
        category,
        difficulty,
        solution: format!("{} - solution", title),
        hints: vec!["Think about symmetry".to_string()],
        tags: vec!["interview".to_string()],
        company_tags: vec!["Citadel".to_string()],
    }
}

pub async fn question(storage: &Storage, category: Category, difficulty: Difficulty) -> Question {
    let title = format!("Question {}", Uuid::new_v4());
    storage
        .questions
        .create_question(new_question(&title, category, difficulty))
        .await
        .expect("create question")
}
