//! `seatbot-scheduler` — time-triggered execution of booking attempts.
//!
//! # Overview
//!
//! Each scheduled booking is a one-shot job held in an in-process
//! registry and armed as its own tokio task. Jobs move through
//! `Pending -> Running -> {Done | Failed}` exactly once; there is no
//! cancellation and no persistence, so a restart loses pending jobs —
//! a documented limitation, not an accident.
//!
//! The actual booking work is behind the [`engine::BookingRunner`] trait
//! so the engine knows nothing about seats or portals.

pub mod engine;
pub mod error;
pub mod schedule;
pub mod types;

pub use engine::{BookingRunner, JobScheduler};
pub use error::{Result, SchedulerError};
pub use types::{JobStatus, ScheduledJob};
