//! `seatbot-booking` — the booking orchestration engine.
//!
//! A booking flows through three layers:
//!
//! 1. [`retry::RetryGate`] wraps a single seat-date call with a bounded
//!    retry loop that absorbs the portal's "not yet open" refusals around
//!    the daily opening instant (clock-skew compensation).
//! 2. [`classify`] reads the portal's free-text refusal messages and the
//!    existing-reservation displays on recommended seats.
//! 3. [`selector::SeatSelector`] orchestrates the whole attempt: the
//!    requested seat first, then either the portal's recommended seats or
//!    the user's preference list when it is occupied.

pub mod classify;
pub mod prefs;
pub mod regions;
pub mod retry;
pub mod selector;

pub use classify::{classify, has_conflict, Rejection};
pub use prefs::PreferenceStore;
pub use retry::RetryGate;
pub use selector::SeatSelector;
