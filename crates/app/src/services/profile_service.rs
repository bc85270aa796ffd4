//! Profile service — the driving port for the editing surface.
//!
//! Validates, writes through the repository, then keeps the orchestrator in
//! step so every committed edit is reflected in the pending jobs. Writes are
//! durable before any job is armed.

use airsched_domain::error::{AirschedError, NotFoundError};
use airsched_domain::id::ProfileId;
use airsched_domain::profile::ScheduleProfile;
use tokio::sync::watch;

use crate::orchestrator::{ScheduleOrchestrator, UpcomingOccurrence};
use crate::ports::{Clock, JobScheduler, ProfileRepository};

/// Application service for schedule profile CRUD plus scheduling side
/// effects.
#[derive(Debug, Clone)]
pub struct ProfileService<R, J, C> {
    repo: R,
    orchestrator: ScheduleOrchestrator<R, J, C>,
}

impl<R, J, C> ProfileService<R, J, C>
where
    R: ProfileRepository + Clone,
    J: JobScheduler,
    C: Clock,
{
    /// Create a new service over the given repository, job scheduler, and
    /// clock.
    pub fn new(repo: R, jobs: J, clock: C) -> Self {
        let orchestrator = ScheduleOrchestrator::new(repo.clone(), jobs, clock);
        Self { repo, orchestrator }
    }

    /// Create a profile and arm its jobs.
    ///
    /// # Errors
    ///
    /// Returns [`AirschedError::Validation`] if invariants fail, or a
    /// storage/scheduler error.
    #[tracing::instrument(skip(self, profile), fields(start = %profile.start_time))]
    pub async fn create_profile(
        &self,
        profile: ScheduleProfile,
    ) -> Result<ScheduleProfile, AirschedError> {
        profile.validate()?;
        let created = self.repo.create(profile).await?;
        self.orchestrator.on_create(&created).await?;
        Ok(created)
    }

    /// Look up a profile by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`AirschedError::NotFound`] when no profile with `id` exists.
    #[tracing::instrument(skip(self))]
    pub async fn get_profile(&self, id: ProfileId) -> Result<ScheduleProfile, AirschedError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id).into())
    }

    /// List all profiles, ordered by start time.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_profiles(&self) -> Result<Vec<ScheduleProfile>, AirschedError> {
        self.repo.get_all().await
    }

    /// Overwrite an existing profile and re-arm (or cancel) its jobs.
    ///
    /// # Errors
    ///
    /// Returns [`AirschedError::Validation`] if invariants fail,
    /// [`AirschedError::NotFound`] if the id is unknown, or a
    /// storage/scheduler error.
    #[tracing::instrument(skip(self, profile), fields(profile_id = %profile.id))]
    pub async fn update_profile(
        &self,
        profile: ScheduleProfile,
    ) -> Result<ScheduleProfile, AirschedError> {
        profile.validate()?;
        if self.repo.get_by_id(profile.id).await?.is_none() {
            return Err(not_found(profile.id).into());
        }
        let updated = self.repo.update(profile).await?;
        self.orchestrator.on_update(&updated).await?;
        Ok(updated)
    }

    /// Delete a profile, cancelling its pending jobs first.
    ///
    /// # Errors
    ///
    /// Returns [`AirschedError::NotFound`] if the id is unknown, or a
    /// storage/scheduler error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_profile(&self, id: ProfileId) -> Result<(), AirschedError> {
        if self.repo.get_by_id(id).await?.is_none() {
            return Err(not_found(id).into());
        }
        self.orchestrator.on_delete(id).await?;
        self.repo.delete(id).await
    }

    /// Preview of future firings, soonest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn upcoming(&self) -> Result<Vec<UpcomingOccurrence>, AirschedError> {
        self.orchestrator.upcoming().await
    }

    /// Live view of the full profile list.
    #[must_use]
    pub fn subscribe_all(&self) -> watch::Receiver<Vec<ScheduleProfile>> {
        self.repo.subscribe_all()
    }

    /// Restart path: recompute and re-arm every stored profile.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the profile list cannot be loaded.
    pub async fn rearm_all(&self) -> Result<(), AirschedError> {
        self.orchestrator.rearm_all().await
    }
}

fn not_found(id: ProfileId) -> NotFoundError {
    NotFoundError {
        entity: "ScheduleProfile",
        id: id.to_string(),
    }
}
