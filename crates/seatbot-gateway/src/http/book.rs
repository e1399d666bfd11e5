//! POST /api/book — the single entry point for immediate and deferred
//! bookings.
//!
//! Request: `{"seatno": "Z101", "seatdate": "2026-09-01",
//!            "datetime": [540, 600], "mode": "now", "content": "current"}`
//!
//! `mode: now` runs the booking chain synchronously and returns its
//! result. `mode: next7` defers to tomorrow's opening instant;
//! `next7_normal` additionally jitters the fire time.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Local, NaiveTime};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use seatbot_core::types::{BookingContent, BookingRequest, TimeRange};

use super::client_id;
use crate::app::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookMode {
    /// Book right now.
    Now,
    /// Defer to tomorrow's opening instant.
    Next7,
    /// Defer with a jittered fire time to avoid the stampede.
    Next7Normal,
}

#[derive(Deserialize)]
pub struct BookPayload {
    #[serde(default)]
    pub seatno: String,
    pub seatdate: String,
    /// `[startMin, endMin]`, minutes since midnight.
    pub datetime: [u16; 2],
    pub mode: BookMode,
    #[serde(default = "default_content")]
    pub content: BookingContent,
}

fn default_content() -> BookingContent {
    BookingContent::Explicit
}

pub async fn book_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<BookPayload>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let seat = payload.seatno.trim();
    let request = BookingRequest {
        seat_code: (!seat.is_empty()).then(|| seat.to_string()),
        date: payload.seatdate.clone(),
        range: TimeRange::new(payload.datetime[0], payload.datetime[1]),
        content: payload.content,
        client_id: client_id(&headers),
    };

    if let Err(e) = request.validate() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"code": -1, "msg": e.to_string()})),
        ));
    }

    match payload.mode {
        BookMode::Now => {
            let result = state.selector.book(&request).await;
            Ok(Json(
                serde_json::to_value(&result)
                    .unwrap_or_else(|_| json!({"code": -1, "msg": "内部错误"})),
            ))
        }
        mode => {
            let Some(fire_at) =
                next_opening_instant(&state.config.portal.opening_time, Local::now())
            else {
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"code": -1, "msg": "开放时间配置无效"})),
                ));
            };
            let job = state
                .scheduler
                .schedule(request, fire_at, mode == BookMode::Next7Normal);
            info!(job_id = %job.id, scheduled_for = %job.scheduled_for, "booking deferred");
            let scheduled_for = job.scheduled_for.format("%Y-%m-%d %H:%M:%S").to_string();
            Ok(Json(json!({
                "code": 0,
                "msg": format!("已安排在 {scheduled_for} 执行"),
                "job_id": job.id,
                "scheduled_for": scheduled_for,
                "seatno": job.request.seat_code,
                "seatdate": job.run_date,
                "datetime": [job.request.range.start_min, job.request.range.end_min],
            })))
        }
    }
}

/// Tomorrow at the portal's opening time, local clock. `None` only when
/// the configured opening time is not `HH:MM`.
fn next_opening_instant(opening_time: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let time = NaiveTime::parse_from_str(opening_time, "%H:%M").ok()?;
    let tomorrow = now.date_naive().succ_opt()?;
    tomorrow.and_time(time).and_local_timezone(Local).earliest()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn next_opening_is_tomorrow_at_the_configured_time() {
        let now = Local::now();
        let fire_at = next_opening_instant("07:00", now).unwrap();
        assert_eq!(fire_at.date_naive(), now.date_naive().succ_opt().unwrap());
        assert_eq!(fire_at.hour(), 7);
        assert_eq!(fire_at.minute(), 0);
    }

    #[test]
    fn malformed_opening_time_is_rejected() {
        assert!(next_opening_instant("7 o'clock", Local::now()).is_none());
        assert!(next_opening_instant("", Local::now()).is_none());
    }

    #[test]
    fn mode_wire_values() {
        assert_eq!(
            serde_json::from_str::<BookMode>("\"now\"").unwrap(),
            BookMode::Now
        );
        assert_eq!(
            serde_json::from_str::<BookMode>("\"next7\"").unwrap(),
            BookMode::Next7
        );
        assert_eq!(
            serde_json::from_str::<BookMode>("\"next7_normal\"").unwrap(),
            BookMode::Next7Normal
        );
    }
}
