//! Heartbeat endpoint

use crate::{error::Result, AppState};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

/// `?extended` switches on the extended checks; its value is ignored.
#[derive(Debug, Deserialize)]
pub struct HeartbeatQuery {
    extended: Option<String>,
}

pub async fn handle_heartbeat(
    State(state): State<AppState>,
    Query(params): Query<HeartbeatQuery>,
) -> Result<Response> {
    let extended = params.extended.is_some();
    info!("GET /heartbeat - extended: {}", extended);

    let report = state.heartbeat.run(extended).await?;

    if report.is_healthy() {
        Ok((StatusCode::OK, Json(report.statuses())).into_response())
    } else {
        let failures = report.failures();
        warn!("Heartbeat failed for: {:?}", failures.keys().collect::<Vec<_>>());
        Ok((StatusCode::SERVICE_UNAVAILABLE, Json(failures)).into_response())
    }
}
