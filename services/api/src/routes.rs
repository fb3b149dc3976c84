//! API service routes

mod progress;
mod questions;
mod users;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
    routing::{get, patch, post, put},
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::state::AppState;

/// Cross-origin access for the browser client
fn cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH])
        .allow_headers([CONTENT_TYPE])
}

/// Create the router for the API service
pub fn create_router(state: AppState, allowed_origins: Vec<HeaderValue>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/users", post(users::create_user))
        .route("/users/:id", get(users::get_user))
        .route("/questions", get(questions::list_questions))
        .route("/questions/meta", get(questions::question_metadata))
        .route("/questions/:id", get(questions::get_question))
        .route("/progress", post(progress::record_attempt))
        .route("/progress/:user_id", get(progress::list_progress))
        .route("/progress/:user_id/summary", get(progress::progress_summary))
        .route(
            "/progress/:user_id/:question_id",
            get(progress::get_progress),
        )
        .route(
            "/progress/:user_id/:question_id/bookmark",
            patch(progress::set_bookmark),
        )
        .route(
            "/progress/:user_id/:question_id/notes",
            put(progress::set_notes),
        )
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

/// Health check endpoint; probes the database when one is configured
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.db_pool {
        None => "not configured",
        Some(pool) => match common::database::health_check(pool).await {
            Ok(true) => "ok",
            Ok(false) => "unavailable",
            Err(e) => {
                warn!("Database health check failed: {}", e);
                "unavailable"
            }
        },
    };

    let (status, label) = if database == "unavailable" {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    } else {
        (StatusCode::OK, "ok")
    };

    (
        status,
        Json(json!({
            "status": label,
            "service": "qf-api",
            "database": database,
        })),
    )
}
