//! API models for request payloads

use progress::Outcome;
use serde::Deserialize;
use uuid::Uuid;

/// Request for user registration
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
}

/// Request for recording one attempt
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAttemptRequest {
    pub user_id: Uuid,
    pub question_id: Uuid,
    /// Signed so that a negative value reaches validation instead of
    /// failing deserialization
    pub elapsed_seconds: i64,
    pub outcome: Outcome,
}

/// Request for toggling a bookmark
#[derive(Debug, Deserialize)]
pub struct BookmarkRequest {
    pub bookmarked: bool,
}

/// Request for replacing notes
#[derive(Debug, Deserialize)]
pub struct NotesRequest {
    #[serde(default)]
    pub notes: Option<String>,
}
