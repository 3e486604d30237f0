/*
 * Responsibility
 * - GET /health (疎通用)
 * - gate の外側に置く (token 不要)
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"status": "ok", "store": state.profiles.backend_name()})),
    )
}
