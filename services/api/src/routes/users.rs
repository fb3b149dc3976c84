//! User routes

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use progress::NewUser;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::CreateUserRequest,
    state::AppState,
};

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateUserRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .storage
        .users
        .create_user(NewUser::new(payload.username))
        .await?;

    info!(user_id = %user.id, "Created user {}", user.username);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "user": user })),
    ))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .storage
        .users
        .find_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))?;

    Ok(Json(json!({ "status": "success", "user": user })))
}
