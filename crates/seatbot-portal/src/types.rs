use serde::{Deserialize, Serialize};

/// The portal's universal reply envelope.
///
/// `data`, when present, is a JSON document encoded as a string and must
/// be parsed a second time by the caller that knows its shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalReply {
    pub code: i32,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: Option<String>,
}

/// One seat from the seat-map listing.
#[derive(Debug, Clone, Deserialize)]
pub struct SeatPoint {
    #[serde(rename = "SeatNo")]
    pub seat_no: String,
}

/// One entry from the recommended-seat listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendedSeat {
    #[serde(rename = "SeatNo")]
    pub seat_no: String,
    /// Existing-reservation display for the seat, e.g. `"09:00-12:00"`,
    /// or the portal's no-reservation sentinel.
    #[serde(rename = "ReserveTime", default)]
    pub reserve_time: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub real_name: String,
}

/// Result of the login-liveness probe.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeOutcome {
    pub ok: bool,
    /// Which endpoint confirmed the session ("basic" or "nav").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}
