//! Cookie editor endpoints.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

use seatbot_portal::EDITABLE_COOKIES;

use super::client_id;
use crate::app::AppState;

/// GET /api/cookies — the effective editable fields, every editable name
/// present even when unset so the editor can render a stable form.
pub async fn get_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<BTreeMap<String, String>> {
    let current = state.cookies.fields(client_id(&headers).as_deref());
    let mut out = BTreeMap::new();
    for name in EDITABLE_COOKIES {
        out.insert(
            name.to_string(),
            current.get(*name).cloned().unwrap_or_default(),
        );
    }
    Json(out)
}

/// POST /api/cookies — replace the caller's cookie set from the posted
/// name→value map. Unrecognized names are ignored.
pub async fn save_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(fields): Json<HashMap<String, String>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.cookies.save(client_id(&headers).as_deref(), &fields) {
        Ok(count) => Ok(Json(json!({"code": 0, "msg": "已保存", "count": count}))),
        Err(e) => {
            warn!(err = %e, "cookie save failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"code": -1, "msg": "保存失败"})),
            ))
        }
    }
}
