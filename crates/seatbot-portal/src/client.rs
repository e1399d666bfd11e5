use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use seatbot_core::config::{PortalConfig, PORTAL_TIMEOUT_SECS};
use seatbot_core::types::{BookingResult, TimeRange};

use crate::error::{PortalError, Result};
use crate::types::{PortalReply, ProbeOutcome, RecommendedSeat, SeatPoint, UserInfo};

/// How much of a non-JSON body is kept for diagnostics.
const SNIPPET_CHARS: usize = 500;

/// The portal calls the booking engine depends on. Trait seam so the
/// retry gate and seat selector can be exercised against a scripted
/// portal in tests.
#[async_trait]
pub trait ReservationApi: Send + Sync {
    /// One seat-date booking call. `code == 0` in the result means the
    /// portal accepted the reservation.
    async fn book_seat(
        &self,
        cookie: &str,
        seat_code: &str,
        date: &str,
        range: TimeRange,
    ) -> Result<BookingResult>;

    /// Alternative seats the portal suggests for a region, in the
    /// portal's own preference order.
    async fn recommended_seats(
        &self,
        cookie: &str,
        region: &str,
        date: &str,
    ) -> Result<Vec<RecommendedSeat>>;
}

/// reqwest-backed client for the reservation portal.
///
/// A single instance is shared across all handlers and scheduled jobs;
/// `reqwest::Client` is internally pooled.
pub struct PortalClient {
    client: reqwest::Client,
    base_url: String,
    host: String,
    user_agent: String,
}

impl PortalClient {
    pub fn new(config: &PortalConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PORTAL_TIMEOUT_SECS))
            // The portal serves an incomplete certificate chain.
            .danger_accept_invalid_certs(true)
            .no_proxy()
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            host: config.host.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    /// The fixed header set the portal expects from its WeChat mini-site,
    /// plus the session cookie when one is available.
    fn apply_headers(&self, builder: reqwest::RequestBuilder, cookie: &str) -> reqwest::RequestBuilder {
        let builder = builder
            .header("Host", &self.host)
            .header("Origin", &self.base_url)
            .header("Referer", format!("{}/mobile/wxindex.aspx", self.base_url))
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json, text/javascript, */*; q=0.01")
            .header("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8")
            .header("X-Requested-With", "XMLHttpRequest");
        if cookie.is_empty() {
            builder
        } else {
            builder.header("Cookie", cookie)
        }
    }

    /// GET `path` and return the raw status/body pair.
    async fn get_text(&self, path: &str, params: &[(&str, &str)], cookie: &str) -> Result<(u16, String)> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .apply_headers(self.client.get(&url).query(params), cookie)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        Ok((status, text))
    }

    /// GET `path` and parse the `{code, msg, data}` envelope.
    async fn get_reply(&self, path: &str, params: &[(&str, &str)], cookie: &str) -> Result<PortalReply> {
        debug!(%path, "portal request");
        let (status, text) = self.get_text(path, params, cookie).await?;
        serde_json::from_str(&text).map_err(|_| {
            warn!(status, %path, "portal reply is not a JSON envelope");
            PortalError::Parse {
                status,
                snippet: snippet(&text),
            }
        })
    }

    /// Parse the string-wrapped `data` payload of a successful envelope.
    fn parse_data<T: serde::de::DeserializeOwned>(reply: &PortalReply) -> Result<T> {
        let data = reply.data.as_deref().unwrap_or_default();
        serde_json::from_str(data).map_err(|_| PortalError::Parse {
            status: 200,
            snippet: snippet(data),
        })
    }

    /// Reading-room listing, passed through verbatim to the front-end.
    pub async fn seat_addresses(&self, cookie: &str) -> Result<serde_json::Value> {
        let reply = self
            .get_reply(
                "/apim/seat/SeatAddressHandler.ashx",
                &[("data_type", "list")],
                cookie,
            )
            .await?;
        if reply.code != 0 {
            warn!(code = reply.code, msg = %reply.msg, "seat address listing refused");
            return Ok(serde_json::Value::Array(vec![]));
        }
        Self::parse_data(&reply)
    }

    /// Seat numbers for one room's map.
    pub async fn seat_map(&self, cookie: &str, room_id: &str) -> Result<Vec<String>> {
        let reply = self
            .get_reply(
                "/apim/seat/SeatInfoHandler.ashx",
                &[("data_type", "getMapPointInit"), ("mapid", room_id)],
                cookie,
            )
            .await?;
        if reply.code != 0 {
            return Ok(vec![]);
        }
        let points: Vec<SeatPoint> = Self::parse_data(&reply)?;
        Ok(points.into_iter().map(|p| p.seat_no).collect())
    }

    /// Account lookup. The apim endpoint works for fresh sessions; older
    /// sessions only answer on the mobile handler, so both are tried.
    /// Lookup failures degrade to an empty record rather than an error.
    pub async fn user_info(&self, cookie: &str) -> UserInfo {
        match self
            .get_reply(
                "/apim/user/UserHandler.ashx",
                &[("data_type", "user_info")],
                cookie,
            )
            .await
        {
            Ok(reply) if reply.code == 0 => {
                if let Ok(info) = Self::parse_data::<UserInfo>(&reply) {
                    return info;
                }
            }
            Ok(reply) => debug!(code = reply.code, "apim user lookup refused"),
            Err(e) => debug!(err = %e, "apim user lookup failed"),
        }

        let url = format!("{}/mobile/ajax/user/UserHandler.ashx", self.base_url);
        let outcome = async {
            let resp = self
                .apply_headers(self.client.post(&url), cookie)
                .form(&[("data_type", "user_info")])
                .send()
                .await?;
            let reply: PortalReply = resp.json().await?;
            if reply.code == 0 {
                return Ok(Self::parse_data::<UserInfo>(&reply).unwrap_or_default());
            }
            Ok(UserInfo::default())
        }
        .await;
        outcome.unwrap_or_else(|e: PortalError| {
            warn!(err = %e, "mobile user lookup failed");
            UserInfo::default()
        })
    }

    /// Login-liveness probe: a logged-in session gets JSON from the basic
    /// handler; a dead one is redirected to an HTML login page. The nav
    /// handler is a second chance for sessions mid-migration.
    pub async fn probe(&self, cookie: &str) -> Result<ProbeOutcome> {
        let (status, text) = self
            .get_text("/apim/basic/BasicHandler.ashx", &[], cookie)
            .await?;
        if serde_json::from_str::<serde_json::Value>(&text).is_ok() {
            return Ok(ProbeOutcome {
                ok: true,
                via: Some("basic"),
                status: None,
                raw: None,
            });
        }

        let (_, nav_text) = self.get_text("/apim/nav/NavHandler.ashx", &[], cookie).await?;
        if serde_json::from_str::<serde_json::Value>(&nav_text).is_ok() {
            return Ok(ProbeOutcome {
                ok: true,
                via: Some("nav"),
                status: None,
                raw: None,
            });
        }

        Ok(ProbeOutcome {
            ok: false,
            via: None,
            status: Some(status),
            raw: Some(snippet(&text)),
        })
    }
}

#[async_trait]
impl ReservationApi for PortalClient {
    async fn book_seat(
        &self,
        cookie: &str,
        seat_code: &str,
        date: &str,
        range: TimeRange,
    ) -> Result<BookingResult> {
        let datetime = range.as_param();
        let reply = self
            .get_reply(
                "/apim/seat/SeatDateHandler.ashx",
                &[
                    ("data_type", "seatDate"),
                    ("seatno", seat_code),
                    ("seatdate", date),
                    ("datetime", &datetime),
                ],
                cookie,
            )
            .await?;
        debug!(seat = %seat_code, code = reply.code, msg = %reply.msg, "seat-date reply");
        Ok(BookingResult {
            code: reply.code,
            msg: reply.msg.clone(),
            seat_used: None,
            raw: serde_json::to_value(&reply).ok(),
        })
    }

    async fn recommended_seats(
        &self,
        cookie: &str,
        region: &str,
        date: &str,
    ) -> Result<Vec<RecommendedSeat>> {
        let reply = self
            .get_reply(
                "/apim/seat/SeatInfoHandler.ashx",
                &[
                    ("data_type", "seatRecommend"),
                    ("area", region),
                    ("seatdate", date),
                ],
                cookie,
            )
            .await?;
        if reply.code != 0 {
            warn!(code = reply.code, msg = %reply.msg, "recommendation listing refused");
            return Ok(vec![]);
        }
        Self::parse_data(&reply)
    }
}

fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_CHARS).collect()
}
