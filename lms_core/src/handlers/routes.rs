//! HTTP routes

use crate::{
    handlers::{gating::handle_content_gate, heartbeat::handle_heartbeat},
    models::ApiResponse,
    AppState,
};
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handle_root))
        .route("/heartbeat", get(handle_heartbeat))
        .route(
            "/api/courses/:course_id/blocks/:usage_key/gate",
            get(handle_content_gate),
        )
}

async fn handle_root(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(serde_json::json!({
        "app": state.app_name,
        "version": state.version,
        "endpoints": {
            "heartbeat": "/heartbeat",
            "content_gate": "/api/courses/{course_id}/blocks/{usage_key}/gate?user={username}"
        }
    })))
}
