//! Domain models for users, catalog questions and per-user progress

pub mod progress;
pub mod question;
pub mod user;

// Re-export for convenience
pub use progress::{
    CategoryProgress, Outcome, ProgressChange, ProgressEntry, ProgressFilter, ProgressRecord,
    ProgressStatus, ProgressSummary, QuestionSummary,
};
pub use question::{Category, Difficulty, NewQuestion, Question, QuestionFilter, QuestionPage};
pub use user::{NewUser, User};
