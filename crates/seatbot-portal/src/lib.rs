//! `seatbot-portal` — HTTP client for the remote reservation portal and
//! the cookie store that authenticates it.
//!
//! The portal is a legacy ASP.NET site consumed through its WeChat
//! mini-site endpoints. Every reply is a `{code, msg, data}` envelope
//! whose `data` field is a JSON document *encoded as a string*; the
//! client unwraps both layers and folds transport problems into
//! [`PortalError`].

pub mod client;
pub mod cookies;
pub mod error;
pub mod types;

pub use client::{PortalClient, ReservationApi};
pub use cookies::{CookieStore, EDITABLE_COOKIES};
pub use error::{PortalError, Result};
pub use types::{PortalReply, ProbeOutcome, RecommendedSeat, UserInfo};
