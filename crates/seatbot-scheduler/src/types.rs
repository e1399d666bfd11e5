use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use seatbot_core::types::{BookingRequest, BookingResult};

/// Lifecycle state of a scheduled booking job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Armed, waiting for its fire instant.
    Pending,
    /// The booking attempt is executing right now.
    Running,
    /// The attempt ran to completion; the result (success or refusal)
    /// is stored on the job.
    Done,
    /// The attempt hit an internal fault; a synthetic error result is
    /// stored on the job.
    Failed,
}

impl JobStatus {
    /// Done and Failed are terminal; no transition leaves them.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// One deferred booking, mutated only by the timer task that owns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJob {
    /// UUID v4 string.
    pub id: String,
    /// Logical client that scheduled the job, if any.
    pub client_id: Option<String>,
    pub created_at: DateTime<Local>,
    /// Fire instant, jitter already applied.
    pub scheduled_for: DateTime<Local>,
    pub status: JobStatus,
    /// The booking intent as submitted.
    pub request: BookingRequest,
    /// Calendar date the job books for: `scheduled_for`'s date, which can
    /// differ from `request.date` when arming crosses midnight.
    pub run_date: String,
    /// Present once the job is terminal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<BookingResult>,
}
