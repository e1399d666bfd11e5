use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use dashmap::DashMap;
use tracing::{error, info};
use uuid::Uuid;

use seatbot_core::config::SchedulerConfig;
use seatbot_core::types::{BookingRequest, BookingResult};

use crate::error::{Result, SchedulerError};
use crate::schedule::{delay_until, jittered_instant};
use crate::types::{JobStatus, ScheduledJob};

/// The booking work a fired job performs. `run_date` is the calendar
/// date the job fires on, which overrides the date the request was
/// authored with.
#[async_trait]
pub trait BookingRunner: Send + Sync {
    async fn run(
        &self,
        request: &BookingRequest,
        run_date: &str,
    ) -> seatbot_core::error::Result<BookingResult>;
}

/// In-memory job scheduler: a DashMap registry plus one tokio task per
/// armed job. Jobs are independent — two jobs racing for the same seat
/// are not serialized against each other.
pub struct JobScheduler {
    jobs: Arc<DashMap<String, ScheduledJob>>,
    runner: Arc<dyn BookingRunner>,
    jitter_mean_secs: f64,
    jitter_std_secs: f64,
}

impl JobScheduler {
    pub fn new(runner: Arc<dyn BookingRunner>, config: &SchedulerConfig) -> Self {
        Self {
            jobs: Arc::new(DashMap::new()),
            runner,
            jitter_mean_secs: config.jitter_mean_secs,
            jitter_std_secs: config.jitter_std_secs,
        }
    }

    /// Register a job and arm its one-shot timer. Returns the job as
    /// registered (status Pending, fire instant with jitter applied).
    pub fn schedule(
        &self,
        request: BookingRequest,
        fire_at: DateTime<Local>,
        jitter: bool,
    ) -> ScheduledJob {
        let fire_at = if jitter {
            jittered_instant(fire_at, self.jitter_mean_secs, self.jitter_std_secs)
        } else {
            fire_at
        };

        let job = ScheduledJob {
            id: Uuid::new_v4().to_string(),
            client_id: request.client_id.clone(),
            created_at: Local::now(),
            scheduled_for: fire_at,
            status: JobStatus::Pending,
            // Book for the date the job actually executes on, not the date
            // the request was authored on.
            run_date: fire_at.format("%Y-%m-%d").to_string(),
            request,
            result: None,
        };

        self.jobs.insert(job.id.clone(), job.clone());
        info!(job_id = %job.id, scheduled_for = %fire_at, "job armed");
        self.arm(job.clone());
        job
    }

    /// Jobs, optionally filtered to one owner, ascending by fire instant.
    pub fn list(&self, client_id: Option<&str>) -> Vec<ScheduledJob> {
        let mut jobs: Vec<ScheduledJob> = self
            .jobs
            .iter()
            .filter(|entry| {
                client_id.map_or(true, |id| entry.value().client_id.as_deref() == Some(id))
            })
            .map(|entry| entry.value().clone())
            .collect();
        jobs.sort_by_key(|job| job.scheduled_for);
        jobs
    }

    pub fn get(&self, id: &str) -> Result<ScheduledJob> {
        self.jobs
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SchedulerError::JobNotFound { id: id.to_string() })
    }

    /// Spawn the one-shot task that owns this job's state transitions.
    /// The task must terminate the job no matter what the runner does —
    /// a job fault is recorded as Failed, never propagated.
    fn arm(&self, job: ScheduledJob) {
        let jobs = Arc::clone(&self.jobs);
        let runner = Arc::clone(&self.runner);

        tokio::spawn(async move {
            tokio::time::sleep(delay_until(job.scheduled_for, Local::now())).await;

            if let Some(mut entry) = jobs.get_mut(&job.id) {
                entry.status = JobStatus::Running;
            }
            info!(job_id = %job.id, run_date = %job.run_date, "job firing");

            // The runner executes in its own task so even a panic inside
            // it surfaces here as a JoinError instead of killing the job.
            let request = job.request.clone();
            let run_date = job.run_date.clone();
            let outcome =
                tokio::spawn(async move { runner.run(&request, &run_date).await }).await;

            let (status, result) = match outcome {
                Ok(Ok(result)) => {
                    info!(job_id = %job.id, code = result.code, "job finished");
                    (JobStatus::Done, result)
                }
                Ok(Err(e)) => {
                    error!(job_id = %job.id, err = %e, "job failed");
                    (JobStatus::Failed, BookingResult::failure(format!("执行失败: {e}")))
                }
                Err(join_err) => {
                    error!(job_id = %job.id, err = %join_err, "job task panicked");
                    (
                        JobStatus::Failed,
                        BookingResult::failure("执行失败: 内部错误"),
                    )
                }
            };

            if let Some(mut entry) = jobs.get_mut(&job.id) {
                entry.status = status;
                entry.result = Some(result);
            }
        });
    }
}
