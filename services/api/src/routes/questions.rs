//! Question catalog routes

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use progress::QuestionFilter;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// List questions with filtering and pagination
pub async fn list_questions(
    State(state): State<AppState>,
    WithRejection(Query(filter), _): WithRejection<Query<QuestionFilter>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let page = state.catalog.list(&filter).await?;

    Ok(Json(json!({
        "status": "success",
        "questions": page.items,
        "page": page.page,
        "limit": page.limit,
        "total": page.total,
    })))
}

/// Category and difficulty values for the client's selectors
pub async fn question_metadata(State(state): State<AppState>) -> impl IntoResponse {
    let metadata = state.catalog.metadata();

    Json(json!({
        "status": "success",
        "categories": metadata.categories,
        "difficulties": metadata.difficulties,
    }))
}

/// Get a question by ID
pub async fn get_question(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let question = state.catalog.get(id).await?;

    Ok(Json(json!({ "status": "success", "question": question })))
}
