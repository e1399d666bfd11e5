//! `seatbot-core` — configuration and shared types for the seat
//! reservation service.
//!
//! Everything the other crates exchange lives here: the booking
//! request/result pair, the persisted cookie record format, and the
//! TOML + env configuration loader.

pub mod config;
pub mod error;
pub mod types;

pub use config::SeatbotConfig;
pub use error::{Result, SeatbotError};
pub use types::{BookingContent, BookingRequest, BookingResult, CookieRecord, TimeRange};
