//! Pass-through endpoints for portal lookups: rooms, seat maps, the
//! account record, and the login-liveness probe.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use seatbot_portal::types::UserInfo;

use super::client_id;
use crate::app::AppState;

/// GET /api/rooms — the reading-room listing, verbatim. Lookup failures
/// degrade to an empty list so the front-end renders an empty picker
/// instead of an error page.
pub async fn rooms_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<Value> {
    let cookie = state.cookies.resolve(client_id(&headers).as_deref());
    match state.portal.seat_addresses(&cookie).await {
        Ok(rooms) => Json(rooms),
        Err(e) => {
            warn!(err = %e, "room listing failed");
            Json(Value::Array(vec![]))
        }
    }
}

#[derive(Deserialize)]
pub struct SeatsQuery {
    #[serde(default)]
    pub room_id: String,
}

/// GET /api/seats?room_id=… — seat codes for one room.
pub async fn seats_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SeatsQuery>,
) -> Json<Value> {
    let cookie = state.cookies.resolve(client_id(&headers).as_deref());
    match state.portal.seat_map(&cookie, &query.room_id).await {
        Ok(seats) => Json(json!(seats)),
        Err(e) => {
            warn!(err = %e, room = %query.room_id, "seat map lookup failed");
            Json(Value::Array(vec![]))
        }
    }
}

/// GET /api/user — the portal account record; empty fields when the
/// session is dead.
pub async fn user_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<UserInfo> {
    let cookie = state.cookies.resolve(client_id(&headers).as_deref());
    Json(state.portal.user_info(&cookie).await)
}

/// GET /api/verify — session liveness probe.
pub async fn verify_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<Value> {
    let cookie = state.cookies.resolve(client_id(&headers).as_deref());
    match state.portal.probe(&cookie).await {
        Ok(outcome) => Json(
            serde_json::to_value(&outcome).unwrap_or_else(|_| json!({"ok": false})),
        ),
        Err(e) => Json(json!({"ok": false, "error": e.diagnostic()})),
    }
}
