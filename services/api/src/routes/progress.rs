//! Progress routes

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use progress::ProgressFilter;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{BookmarkRequest, NotesRequest, RecordAttemptRequest},
    state::AppState,
};

/// Record one attempt at a question
pub async fn record_attempt(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<RecordAttemptRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let progress = state
        .tracker
        .record_attempt(
            payload.user_id,
            payload.question_id,
            payload.elapsed_seconds,
            payload.outcome,
        )
        .await?;

    Ok(Json(json!({ "status": "success", "progress": progress })))
}

/// Add or remove a bookmark
pub async fn set_bookmark(
    State(state): State<AppState>,
    WithRejection(Path((user_id, question_id)), _): WithRejection<Path<(Uuid, Uuid)>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<BookmarkRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let progress = state
        .tracker
        .set_bookmark(user_id, question_id, payload.bookmarked)
        .await?;

    Ok(Json(json!({ "status": "success", "progress": progress })))
}

/// Replace the notes on a progress row
pub async fn set_notes(
    State(state): State<AppState>,
    WithRejection(Path((user_id, question_id)), _): WithRejection<Path<(Uuid, Uuid)>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<NotesRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let progress = state
        .tracker
        .set_notes(user_id, question_id, payload.notes)
        .await?;

    Ok(Json(json!({ "status": "success", "progress": progress })))
}

/// Progress for one question; `null` when the user has none yet
pub async fn get_progress(
    State(state): State<AppState>,
    WithRejection(Path((user_id, question_id)), _): WithRejection<Path<(Uuid, Uuid)>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let progress = state.tracker.get_progress(user_id, question_id).await?;

    Ok(Json(json!({ "status": "success", "progress": progress })))
}

/// All progress of a user, most recent first
pub async fn list_progress(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Query(filter), _): WithRejection<Query<ProgressFilter>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let progress = state.tracker.list_progress(user_id, &filter).await?;

    Ok(Json(json!({ "status": "success", "progress": progress })))
}

/// Aggregate counters for a user
pub async fn progress_summary(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let summary = state.tracker.summary(user_id).await?;

    Ok(Json(json!({ "status": "success", "summary": summary })))
}
