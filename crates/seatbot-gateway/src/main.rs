//! `seatbot-gateway` — the HTTP front door.
//!
//! Wires the portal client, cookie store, seat selector and job
//! scheduler together and serves the JSON API plus the bundled
//! single-page UI.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use seatbot_booking::{PreferenceStore, SeatSelector};
use seatbot_core::config::SeatbotConfig;
use seatbot_portal::{CookieStore, PortalClient, ReservationApi};
use seatbot_scheduler::{BookingRunner, JobScheduler};

mod app;
mod http;

use app::AppState;

#[derive(Parser, Debug)]
#[command(name = "seatbot-gateway", about = "Library seat reservation gateway")]
struct Args {
    /// Path to seatbot.toml (default: ~/.seatbot/seatbot.toml)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "seatbot_gateway=info,seatbot_portal=info,seatbot_booking=info,\
                 seatbot_scheduler=info,tower_http=info",
            )
        }))
        .init();

    let args = Args::parse();
    let config = SeatbotConfig::load(args.config.as_deref()).unwrap_or_else(|e| {
        warn!(err = %e, "config unreadable, falling back to defaults");
        SeatbotConfig::default()
    });

    let portal = Arc::new(PortalClient::new(&config.portal)?);
    let cookies = Arc::new(CookieStore::new(
        config.portal.host.clone(),
        config.storage.cookies_path.clone(),
    ));
    let selector = Arc::new(SeatSelector::new(
        portal.clone() as Arc<dyn ReservationApi>,
        cookies.clone(),
        PreferenceStore::new(config.storage.prefs_path.clone()),
        &config.booking,
        config.portal.opening_time.as_str(),
    ));
    let scheduler = JobScheduler::new(
        selector.clone() as Arc<dyn BookingRunner>,
        &config.scheduler,
    );

    let addr: SocketAddr = format!("{}:{}", config.gateway.bind, config.gateway.port).parse()?;
    let state = Arc::new(AppState {
        config,
        portal,
        cookies,
        selector,
        scheduler,
    });

    info!(%addr, "seatbot gateway listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app::build_router(state)).await?;
    Ok(())
}
