use serde::{Deserialize, Serialize};

use crate::error::{Result, SeatbotError};

/// One browser cookie as stored in `cookies.json`.
///
/// Wire names stay camelCase (`httpOnly`, `sameSite`) so files exported
/// from browser devtools or written by earlier versions load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: String,
    pub path: String,
}

/// Booking window in minutes since midnight, half-open: `[start_min, end_min)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_min: u16,
    pub end_min: u16,
}

impl TimeRange {
    pub fn new(start_min: u16, end_min: u16) -> Self {
        Self { start_min, end_min }
    }

    /// The portal's `datetime` request parameter format, e.g. `"540,600"`.
    pub fn as_param(&self) -> String {
        format!("{},{}", self.start_min, self.end_min)
    }
}

/// How the selector picks a seat when the requested one is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingContent {
    /// Book exactly the requested seat; fall back to the portal's
    /// recommended-seat list when it is occupied.
    #[serde(rename = "current")]
    Explicit,
    /// Walk the user's preference list instead of the requested seat.
    #[serde(rename = "prefs")]
    PreferenceFallback,
}

/// A single booking intent, validated before any portal call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub seat_code: Option<String>,
    /// Target date, `YYYY-MM-DD`.
    pub date: String,
    pub range: TimeRange,
    pub content: BookingContent,
    /// Logical client that owns this request (from `X-Client-Id`).
    pub client_id: Option<String>,
}

impl BookingRequest {
    /// Reject malformed input before it reaches the network.
    pub fn validate(&self) -> Result<()> {
        if self.range.end_min <= self.range.start_min {
            return Err(SeatbotError::Validation(
                "end time must be after start time".into(),
            ));
        }
        if self.content == BookingContent::Explicit
            && self.seat_code.as_deref().map_or(true, |s| s.trim().is_empty())
        {
            return Err(SeatbotError::Validation(
                "seat code is required for an explicit booking".into(),
            ));
        }
        Ok(())
    }
}

/// Outcome of one booking attempt chain. `code == 0` means success; any
/// other code carries the portal's (or our own synthetic) refusal message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResult {
    pub code: i32,
    pub msg: String,
    /// Set when a seat other than the requested one was booked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_used: Option<String>,
    /// The portal's raw reply body, kept for diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

impl BookingResult {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Synthetic failure with no portal reply behind it.
    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            code: -1,
            msg: msg.into(),
            seat_used: None,
            raw: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(content: BookingContent, seat: Option<&str>, start: u16, end: u16) -> BookingRequest {
        BookingRequest {
            seat_code: seat.map(String::from),
            date: "2026-09-01".into(),
            range: TimeRange::new(start, end),
            content,
            client_id: None,
        }
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let req = request(BookingContent::Explicit, Some("Z101"), 600, 540);
        assert!(req.validate().is_err());
        let req = request(BookingContent::Explicit, Some("Z101"), 540, 540);
        assert!(req.validate().is_err());
    }

    #[test]
    fn validate_requires_seat_in_explicit_mode() {
        assert!(request(BookingContent::Explicit, None, 540, 600)
            .validate()
            .is_err());
        assert!(request(BookingContent::Explicit, Some("  "), 540, 600)
            .validate()
            .is_err());
        assert!(request(BookingContent::Explicit, Some("Z101"), 540, 600)
            .validate()
            .is_ok());
    }

    #[test]
    fn validate_allows_missing_seat_in_prefs_mode() {
        assert!(request(BookingContent::PreferenceFallback, None, 540, 600)
            .validate()
            .is_ok());
    }

    #[test]
    fn cookie_record_wire_names_are_camel_case() {
        let record = CookieRecord {
            name: "ASP.NET_SessionId".into(),
            value: "abc".into(),
            domain: "libwx.hunnu.edu.cn".into(),
            secure: true,
            http_only: true,
            same_site: "Lax".into(),
            path: "/".into(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"httpOnly\":true"));
        assert!(json.contains("\"sameSite\":\"Lax\""));
    }

    #[test]
    fn range_param_matches_portal_format() {
        assert_eq!(TimeRange::new(540, 600).as_param(), "540,600");
    }

    #[test]
    fn content_mode_wire_values() {
        assert_eq!(
            serde_json::from_str::<BookingContent>("\"current\"").unwrap(),
            BookingContent::Explicit
        );
        assert_eq!(
            serde_json::from_str::<BookingContent>("\"prefs\"").unwrap(),
            BookingContent::PreferenceFallback
        );
    }
}
