//! Scheduled-job inspection endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};

use seatbot_scheduler::ScheduledJob;

use super::client_id;
use crate::app::AppState;

/// GET /api/scheduled — jobs for the caller, ascending by fire instant.
/// Without an `x-client-id` header all jobs are returned.
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<Vec<ScheduledJob>> {
    let client = client_id(&headers);
    Json(state.scheduler.list(client.as_deref()))
}

/// GET /api/scheduled/{id}
pub async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ScheduledJob>, (StatusCode, Json<Value>)> {
    state.scheduler.get(&id).map(Json).map_err(|e| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"code": -1, "msg": e.to_string()})),
        )
    })
}
