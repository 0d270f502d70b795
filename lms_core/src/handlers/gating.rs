//! Content type gate lookup for a block subtree

use crate::{
    content::validate_course_id,
    error::{AppError, Result},
    models::{request::GateQuery, request::GateResponse, ApiResponse},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use tracing::info;

pub async fn handle_content_gate(
    State(state): State<AppState>,
    Path((course_id, usage_key)): Path<(String, String)>,
    Query(params): Query<GateQuery>,
) -> Result<impl IntoResponse> {
    info!("GET /api/courses/{}/blocks/{}/gate", course_id, usage_key);

    validate_course_id(&course_id)?;

    let course = state
        .module_store
        .get_course(&course_id)
        .ok_or_else(|| AppError::NotFound(format!("Course {} not found", course_id)))?;

    let item = state
        .module_store
        .get_course_item(&course_id, &usage_key)
        .ok_or_else(|| {
            AppError::NotFound(format!("Block {} not found in {}", usage_key, course_id))
        })?;

    let user = params
        .user
        .as_deref()
        .and_then(|username| state.users.get(username));

    let fragment = state.gating.check_children_for_content_type_gating_paywall(
        user.as_ref(),
        &item,
        &course,
        &course_id,
    )?;

    Ok(Json(ApiResponse::success(GateResponse {
        gated: fragment.is_some(),
        fragment,
    })))
}
