use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use seatbot_booking::SeatSelector;
use seatbot_core::config::SeatbotConfig;
use seatbot_portal::{CookieStore, PortalClient};
use seatbot_scheduler::JobScheduler;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: SeatbotConfig,
    pub portal: Arc<PortalClient>,
    pub cookies: Arc<CookieStore>,
    pub selector: Arc<SeatSelector>,
    pub scheduler: JobScheduler,
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(crate::http::ui::ui_handler))
        .route("/api/book", post(crate::http::book::book_handler))
        .route("/api/scheduled", get(crate::http::jobs::list_handler))
        .route("/api/scheduled/{id}", get(crate::http::jobs::get_handler))
        .route(
            "/api/cookies",
            get(crate::http::cookies::get_handler).post(crate::http::cookies::save_handler),
        )
        .route("/api/rooms", get(crate::http::portal::rooms_handler))
        .route("/api/seats", get(crate::http::portal::seats_handler))
        .route("/api/user", get(crate::http::portal::user_handler))
        .route("/api/verify", get(crate::http::portal::verify_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
