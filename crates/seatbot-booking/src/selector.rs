use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use seatbot_core::config::{BookingConfig, RegionRule};
use seatbot_core::types::{BookingContent, BookingRequest, BookingResult};
use seatbot_portal::{CookieStore, ReservationApi};
use seatbot_scheduler::BookingRunner;

use crate::classify::{classify, has_conflict, Rejection};
use crate::prefs::PreferenceStore;
use crate::regions::region_for;
use crate::retry::RetryGate;

/// Orchestrates one booking: the requested seat through the retry gate,
/// then — only when that seat is occupied — a fallback pass over either
/// the portal's recommended seats or the user's preference list.
pub struct SeatSelector {
    api: Arc<dyn ReservationApi>,
    cookies: Arc<CookieStore>,
    prefs: PreferenceStore,
    gate: RetryGate,
    opening_marker: String,
    default_region: String,
    region_rules: Vec<RegionRule>,
}

impl SeatSelector {
    pub fn new(
        api: Arc<dyn ReservationApi>,
        cookies: Arc<CookieStore>,
        prefs: PreferenceStore,
        config: &BookingConfig,
        opening_marker: impl Into<String>,
    ) -> Self {
        let opening_marker = opening_marker.into();
        Self {
            gate: RetryGate::new(config, opening_marker.clone()),
            api,
            cookies,
            prefs,
            opening_marker,
            default_region: config.default_region.clone(),
            region_rules: config.region_rules.clone(),
        }
    }

    /// Run the booking chain for an already-validated request.
    pub async fn book(&self, request: &BookingRequest) -> BookingResult {
        let cookie = self.cookies.resolve(request.client_id.as_deref());
        match request.content {
            BookingContent::Explicit => self.book_explicit(&cookie, request).await,
            BookingContent::PreferenceFallback => self.book_from_prefs(&cookie, request).await,
        }
    }

    fn occupied(&self, result: &BookingResult) -> bool {
        !result.success() && classify(&result.msg, &self.opening_marker) == Some(Rejection::Occupied)
    }

    /// Explicit mode: the requested seat, then the portal's recommended
    /// seats for its region. Only an "occupied" refusal triggers the
    /// fallback; every other outcome is returned unchanged.
    async fn book_explicit(&self, cookie: &str, request: &BookingRequest) -> BookingResult {
        let seat = request.seat_code.as_deref().unwrap_or_default();
        let primary = self
            .gate
            .attempt(self.api.as_ref(), cookie, seat, &request.date, request.range)
            .await;
        if !self.occupied(&primary) {
            return primary;
        }

        let region = region_for(seat, &self.region_rules, &self.default_region);
        info!(seat = %seat, region = %region, "requested seat occupied, trying recommended seats");

        let candidates = match self
            .api
            .recommended_seats(cookie, &region, &request.date)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(err = %e, "recommended seat listing failed");
                return BookingResult::failure(e.diagnostic());
            }
        };

        // Try survivors in the order the portal ranked them.
        for candidate in candidates {
            if has_conflict(&candidate.reserve_time, request.range) {
                debug!(seat = %candidate.seat_no, existing = %candidate.reserve_time,
                       "candidate conflicts with requested range");
                continue;
            }
            let mut result = self
                .gate
                .attempt(
                    self.api.as_ref(),
                    cookie,
                    &candidate.seat_no,
                    &request.date,
                    request.range,
                )
                .await;
            if result.success() {
                info!(seat = %candidate.seat_no, "booked recommended seat");
                result.msg = format!("已改用推荐座位 {}", candidate.seat_no);
                result.seat_used = Some(candidate.seat_no);
                return result;
            }
            debug!(seat = %candidate.seat_no, msg = %result.msg, "recommended seat refused");
        }

        BookingResult::failure("推荐座位均不可用")
    }

    /// Preference mode: walk the user's seat list in order, skipping
    /// codes already tried (the original seat when escalating from an
    /// occupied explicit attempt). A refusal that is *not* an occupancy
    /// is fatal — a malformed code or server error must surface, not be
    /// masked by moving on to the next preference.
    async fn book_from_prefs(&self, cookie: &str, request: &BookingRequest) -> BookingResult {
        let list = self.prefs.load();
        if list.is_empty() {
            return BookingResult::failure("预选座位列表为空");
        }

        let mut tried: HashSet<String> = request.seat_code.iter().cloned().collect();
        for seat in list {
            if !tried.insert(seat.clone()) {
                continue;
            }
            let mut result = self
                .gate
                .attempt(self.api.as_ref(), cookie, &seat, &request.date, request.range)
                .await;
            if result.success() {
                info!(seat = %seat, "booked preference seat");
                result.seat_used = Some(seat);
                return result;
            }
            if !self.occupied(&result) {
                return result;
            }
            debug!(seat = %seat, "preference seat occupied, trying next");
        }

        BookingResult::failure("预选座位均不可用")
    }
}

/// Scheduled jobs run the same chain, re-dated to the day they fire.
#[async_trait]
impl BookingRunner for SeatSelector {
    async fn run(
        &self,
        request: &BookingRequest,
        run_date: &str,
    ) -> seatbot_core::error::Result<BookingResult> {
        let mut request = request.clone();
        request.date = run_date.to_string();
        request.validate()?;
        Ok(self.book(&request).await)
    }
}
