//! Deferred-job ports — durable, crash-surviving execution at an instant.
//!
//! A job is keyed by `(profile id, purpose)`. Re-arming the same pair
//! atomically replaces the pending job, so there is at most one pending job
//! per pair. Jobs survive process restarts: the scheduler persists its slots
//! through a [`JobStore`] and the composition root recomputes occurrences
//! from profile state on startup.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use airsched_domain::error::AirschedError;
use airsched_domain::id::ProfileId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a deferred job corresponds to a profile's start or end action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPurpose {
    Start,
    End,
}

impl fmt::Display for JobPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::End => f.write_str("end"),
        }
    }
}

/// Error parsing a stored purpose string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job purpose: {0:?}")]
pub struct ParseJobPurposeError(pub String);

impl FromStr for JobPurpose {
    type Err = ParseJobPurposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            other => Err(ParseJobPurposeError(other.to_string())),
        }
    }
}

/// A persisted pending job slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingJob {
    pub profile_id: ProfileId,
    pub purpose: JobPurpose,
    /// Absolute firing instant, stored in UTC.
    pub fire_at: DateTime<Utc>,
}

/// What a job body reports back to the scheduler — its only output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Done; the slot is consumed.
    Success,
    /// Transient failure; the scheduler re-attempts with backoff.
    Retry,
    /// Permanent failure; logged, never re-attempted.
    Failure,
}

/// Durable deferred-execution facility keyed by profile id and purpose.
pub trait JobScheduler: Send + Sync {
    /// Arm (or re-arm, replacing any pending job for the pair) a one-shot
    /// job at `fire_at`.
    fn schedule_once(
        &self,
        profile_id: ProfileId,
        purpose: JobPurpose,
        fire_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), AirschedError>> + Send;

    /// Drop the pending job for the pair, if any. Safe to race with the
    /// job's own firing; an execution already in flight runs to completion.
    fn cancel(
        &self,
        profile_id: ProfileId,
        purpose: JobPurpose,
    ) -> impl Future<Output = Result<(), AirschedError>> + Send;
}

/// Persistence behind the scheduler — one row per pending slot.
pub trait JobStore: Send + Sync {
    /// Insert or replace the slot for `(job.profile_id, job.purpose)`.
    fn upsert(&self, job: PendingJob) -> impl Future<Output = Result<(), AirschedError>> + Send;

    /// Remove the slot for the pair, if present.
    fn remove(
        &self,
        profile_id: ProfileId,
        purpose: JobPurpose,
    ) -> impl Future<Output = Result<(), AirschedError>> + Send;

    /// Remove the slot for `(job.profile_id, job.purpose)` only while it
    /// still holds `job.fire_at`. Used when a fired occurrence settles, so a
    /// slot re-armed in the meantime is left untouched.
    fn remove_exact(
        &self,
        job: PendingJob,
    ) -> impl Future<Output = Result<(), AirschedError>> + Send;

    /// All persisted slots, in no particular order.
    fn list_all(&self) -> impl Future<Output = Result<Vec<PendingJob>, AirschedError>> + Send;
}

/// The code a fired job runs — implemented by the schedule executor.
pub trait JobRunner: Send + Sync {
    fn run(
        &self,
        profile_id: ProfileId,
        purpose: JobPurpose,
    ) -> impl Future<Output = JobOutcome> + Send;
}
