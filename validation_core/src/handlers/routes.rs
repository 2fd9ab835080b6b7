//! HTTP routes of the upload service

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use super::uploads::{list_rules, upload_files};
use crate::{models::ApiResponse, AppState};

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/uploads", post(upload_files))
        .route("/api/uploads/rules", get(list_rules))
}

async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(serde_json::json!({
        "status": "healthy",
        "app": state.app_name,
        "version": state.version,
        "upload_fields": state.upload_fields.len(),
        "timestamp": chrono::Utc::now().timestamp(),
    })))
}
