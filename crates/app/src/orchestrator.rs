//! Schedule orchestrator — keeps pending jobs in step with profile edits.
//!
//! Invoked on profile create/update/delete, it recomputes occurrences with
//! the pure calculator and drives the job scheduler. Re-arming is idempotent
//! because the scheduler's replace semantics guarantee at most one pending
//! job per `(profile id, purpose)` pair.

use airsched_domain::error::AirschedError;
use airsched_domain::id::ProfileId;
use airsched_domain::profile::ScheduleProfile;
use airsched_domain::time::{next_end_occurrence, next_start_occurrence};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ports::{Clock, JobPurpose, JobScheduler, ProfileRepository};

/// One previewed future firing, for the editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpcomingOccurrence {
    pub profile_id: ProfileId,
    pub purpose: JobPurpose,
    pub fire_at: DateTime<Utc>,
}

/// Glue between profile edits and the durable job scheduler.
#[derive(Debug, Clone)]
pub struct ScheduleOrchestrator<R, J, C> {
    repo: R,
    jobs: J,
    clock: C,
}

impl<R, J, C> ScheduleOrchestrator<R, J, C>
where
    R: ProfileRepository,
    J: JobScheduler,
    C: Clock,
{
    pub fn new(repo: R, jobs: J, clock: C) -> Self {
        Self { repo, jobs, clock }
    }

    /// Arm jobs for a freshly created profile.
    ///
    /// # Errors
    ///
    /// Propagates scheduler errors.
    #[tracing::instrument(skip(self, profile), fields(profile_id = %profile.id))]
    pub async fn on_create(&self, profile: &ScheduleProfile) -> Result<(), AirschedError> {
        if profile.is_active {
            self.arm(profile).await?;
        }
        Ok(())
    }

    /// Re-arm (or cancel) jobs after any profile edit.
    ///
    /// Runs even when `is_active` did not change: the armed payload must
    /// reflect the latest times and settings.
    ///
    /// # Errors
    ///
    /// Propagates scheduler errors.
    #[tracing::instrument(skip(self, profile), fields(profile_id = %profile.id))]
    pub async fn on_update(&self, profile: &ScheduleProfile) -> Result<(), AirschedError> {
        if profile.is_active {
            self.arm(profile).await
        } else {
            self.disarm(profile.id).await
        }
    }

    /// Cancel both jobs for a profile being deleted.
    ///
    /// # Errors
    ///
    /// Propagates scheduler errors.
    #[tracing::instrument(skip(self))]
    pub async fn on_delete(&self, id: ProfileId) -> Result<(), AirschedError> {
        self.disarm(id).await
    }

    /// Restart path: recompute and re-arm every stored profile.
    ///
    /// Pending occurrences are derived from durable profile state rather
    /// than trusting any timer that happened to survive. Per-profile
    /// scheduler failures are logged and skipped so one bad profile does not
    /// leave the rest disarmed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the profile list cannot be loaded.
    pub async fn rearm_all(&self) -> Result<(), AirschedError> {
        let profiles = self.repo.get_all().await?;
        let total = profiles.len();
        for profile in &profiles {
            if let Err(err) = self.on_update(profile).await {
                tracing::warn!(profile_id = %profile.id, error = %err, "failed to re-arm profile");
            }
        }
        tracing::info!(profiles = total, "re-armed schedules from store");
        Ok(())
    }

    /// Preview of future firings across all active profiles, soonest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the profile list cannot be loaded.
    pub async fn upcoming(&self) -> Result<Vec<UpcomingOccurrence>, AirschedError> {
        let now = self.clock.now();
        let mut occurrences = Vec::new();
        for profile in self.repo.get_all().await? {
            if !profile.is_active {
                continue;
            }
            occurrences.push(UpcomingOccurrence {
                profile_id: profile.id,
                purpose: JobPurpose::Start,
                fire_at: next_start_occurrence(profile.start_time, now).to_utc(),
            });
            if let Some(end) = profile.end_time {
                occurrences.push(UpcomingOccurrence {
                    profile_id: profile.id,
                    purpose: JobPurpose::End,
                    fire_at: next_end_occurrence(profile.start_time, end, now).to_utc(),
                });
            }
        }
        occurrences.sort_by_key(|occ| (occ.fire_at, occ.profile_id, occ.purpose));
        Ok(occurrences)
    }

    async fn arm(&self, profile: &ScheduleProfile) -> Result<(), AirschedError> {
        let now = self.clock.now();
        let start_at = next_start_occurrence(profile.start_time, now);
        self.jobs
            .schedule_once(profile.id, JobPurpose::Start, start_at.to_utc())
            .await?;

        if let Some(end) = profile.end_time {
            let end_at = next_end_occurrence(profile.start_time, end, now);
            self.jobs
                .schedule_once(profile.id, JobPurpose::End, end_at.to_utc())
                .await?;
        } else {
            // An edit may have removed the end time; a stale end job would
            // power the unit off unasked.
            self.jobs.cancel(profile.id, JobPurpose::End).await?;
        }
        tracing::debug!(profile_id = %profile.id, start = %start_at, "armed schedule");
        Ok(())
    }

    async fn disarm(&self, id: ProfileId) -> Result<(), AirschedError> {
        self.jobs.cancel(id, JobPurpose::Start).await?;
        self.jobs.cancel(id, JobPurpose::End).await?;
        tracing::debug!(profile_id = %id, "disarmed schedule");
        Ok(())
    }
}
