use std::time::Duration;

use tracing::{info, warn};

use seatbot_core::config::BookingConfig;
use seatbot_core::types::{BookingResult, TimeRange};
use seatbot_portal::ReservationApi;

use crate::classify::{classify, Rejection};

/// Bounded retry around a single seat-date booking call.
///
/// The portal enforces its opening instant server-side, so a client whose
/// clock runs slightly ahead submits too early and gets a "not yet open"
/// refusal. The gate absorbs that narrow window: it retries only on the
/// opening-time marker or a transport/protocol failure, never on any
/// other refusal.
pub struct RetryGate {
    max_attempts: u32,
    interval: Duration,
    opening_marker: String,
}

impl RetryGate {
    pub fn new(config: &BookingConfig, opening_marker: impl Into<String>) -> Self {
        Self {
            max_attempts: config.max_attempts,
            interval: Duration::from_millis(config.retry_interval_ms),
            opening_marker: opening_marker.into(),
        }
    }

    /// Book `seat_code`, retrying per policy. Transport and protocol
    /// failures fold into failure results; this never returns `Err`.
    /// When attempts run out the last observed result is returned.
    pub async fn attempt(
        &self,
        api: &dyn ReservationApi,
        cookie: &str,
        seat_code: &str,
        date: &str,
        range: TimeRange,
    ) -> BookingResult {
        let mut last: Option<BookingResult> = None;

        for attempt in 1..=self.max_attempts {
            match api.book_seat(cookie, seat_code, date, range).await {
                Ok(result) => {
                    if result.success() {
                        if attempt > 1 {
                            info!(seat = %seat_code, attempt, "booking accepted after retry");
                        }
                        return result;
                    }
                    if classify(&result.msg, &self.opening_marker) != Some(Rejection::NotYetOpen) {
                        return result;
                    }
                    warn!(seat = %seat_code, attempt, msg = %result.msg, "portal not open yet");
                    last = Some(result);
                }
                Err(e) => {
                    warn!(seat = %seat_code, attempt, err = %e, "booking call failed");
                    last = Some(BookingResult::failure(e.diagnostic()));
                }
            }
            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        last.unwrap_or_else(|| BookingResult::failure("预约请求未获得任何响应"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use seatbot_portal::types::RecommendedSeat;
    use seatbot_portal::{PortalError, Result as PortalResult};
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Scripted portal: pops one canned reply per call and records when
    /// each call arrived (paused-clock instants).
    struct ScriptedPortal {
        replies: Mutex<Vec<PortalResult<BookingResult>>>,
        calls: Mutex<Vec<Instant>>,
    }

    impl ScriptedPortal {
        fn new(mut replies: Vec<PortalResult<BookingResult>>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(vec![]),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ReservationApi for ScriptedPortal {
        async fn book_seat(
            &self,
            _cookie: &str,
            _seat_code: &str,
            _date: &str,
            _range: TimeRange,
        ) -> PortalResult<BookingResult> {
            self.calls.lock().unwrap().push(Instant::now());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .expect("scripted portal ran out of replies")
        }

        async fn recommended_seats(
            &self,
            _cookie: &str,
            _region: &str,
            _date: &str,
        ) -> PortalResult<Vec<RecommendedSeat>> {
            Ok(vec![])
        }
    }

    fn gate() -> RetryGate {
        RetryGate::new(&BookingConfig::default(), "07:00")
    }

    fn not_open() -> BookingResult {
        BookingResult {
            code: 1,
            msg: "预约尚未开放，开放时间为07:00".into(),
            seat_used: None,
            raw: None,
        }
    }

    fn ok() -> BookingResult {
        BookingResult {
            code: 0,
            msg: "预约成功".into(),
            seat_used: None,
            raw: None,
        }
    }

    fn range() -> TimeRange {
        TimeRange::new(540, 600)
    }

    #[tokio::test(start_paused = true)]
    async fn caps_at_six_attempts_with_half_second_spacing() {
        let portal = ScriptedPortal::new((0..6).map(|_| Ok(not_open())).collect());
        let started = Instant::now();
        let result = gate().attempt(&portal, "", "Z101", "2026-09-01", range()).await;

        assert_eq!(portal.call_count(), 6);
        assert_eq!(result.code, 1); // last observed refusal, not synthetic
        // 5 sleeps between 6 attempts
        assert!(started.elapsed() >= Duration::from_millis(2500));

        let calls = portal.calls.lock().unwrap();
        for pair in calls.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(500));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn non_marker_failure_is_never_retried() {
        let portal = ScriptedPortal::new(vec![Ok(BookingResult {
            code: 2,
            msg: "座位号格式错误".into(),
            seat_used: None,
            raw: None,
        })]);
        let result = gate().attempt(&portal, "", "bogus", "2026-09-01", range()).await;
        assert_eq!(portal.call_count(), 1);
        assert_eq!(result.code, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn success_after_not_open_refusals() {
        let portal = ScriptedPortal::new(vec![Ok(not_open()), Ok(not_open()), Ok(ok())]);
        let result = gate().attempt(&portal, "", "Z101", "2026-09-01", range()).await;
        assert_eq!(portal.call_count(), 3);
        assert!(result.success());
    }

    #[tokio::test(start_paused = true)]
    async fn network_failure_is_retried_like_not_open() {
        let portal = ScriptedPortal::new(vec![
            Err(PortalError::Parse {
                status: 502,
                snippet: "<html>bad gateway".into(),
            }),
            Ok(ok()),
        ]);
        let result = gate().attempt(&portal, "", "Z101", "2026-09-01", range()).await;
        assert_eq!(portal.call_count(), 2);
        assert!(result.success());
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_network_failures_return_diagnostic_result() {
        let portal = ScriptedPortal::new(
            (0..6)
                .map(|_| {
                    Err(PortalError::Parse {
                        status: 502,
                        snippet: "bad gateway".into(),
                    })
                })
                .collect(),
        );
        let result = gate().attempt(&portal, "", "Z101", "2026-09-01", range()).await;
        assert_eq!(portal.call_count(), 6);
        assert_eq!(result.code, -1);
        assert!(result.msg.contains("502"));
    }
}
