use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repo::{JobTimestamps, StoreError};

/// Next `updated_at`: now at microsecond precision, but always past `prev`.
pub fn next_timestamp(prev: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now);
    let floor = prev + Duration::microseconds(1);
    now.max(floor)
}

/// Owns the one write that moves a job's `updated_at`.
#[derive(Clone)]
pub struct JobActivity {
    jobs: Arc<dyn JobTimestamps>,
}

impl JobActivity {
    pub fn new(jobs: Arc<dyn JobTimestamps>) -> Self {
        Self { jobs }
    }

    #[instrument(name = "signdesk.jobs.touch", skip(self), fields(job_id = %job_id))]
    pub async fn touch(&self, job_id: Uuid) -> Result<DateTime<Utc>, DomainError> {
        let prev = self
            .jobs
            .updated_at(job_id)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| DomainError::not_found("job", job_id))?;

        let next = next_timestamp(prev, Utc::now());
        let found = self
            .jobs
            .set_updated_at(job_id, next)
            .await
            .map_err(store_failure)?;
        if !found {
            return Err(DomainError::not_found("job", job_id));
        }

        info!(updated_at = %next, "job last-modified refreshed");
        Ok(next)
    }
}

fn store_failure(e: StoreError) -> DomainError {
    error!(error = ?e, "job timestamp update failed");
    DomainError::internal(e.to_string())
}
