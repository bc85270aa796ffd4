//! Profile repository port — persistence for schedule profiles.
//!
//! The store exclusively owns persisted profile state; callers hold only
//! transient copies fetched per operation and re-fetch before mutating.

use std::future::Future;

use airsched_domain::error::AirschedError;
use airsched_domain::id::ProfileId;
use airsched_domain::profile::ScheduleProfile;
use tokio::sync::watch;

/// Repository for persisting and querying [`ScheduleProfile`]s.
///
/// Writes are durable once the returned future resolves. Implementations
/// serialize conflicting writes to the same id (last write wins).
pub trait ProfileRepository: Send + Sync {
    /// Insert a new profile, returning it with its store-assigned id.
    fn create(
        &self,
        profile: ScheduleProfile,
    ) -> impl Future<Output = Result<ScheduleProfile, AirschedError>> + Send;

    /// Get a profile by id.
    fn get_by_id(
        &self,
        id: ProfileId,
    ) -> impl Future<Output = Result<Option<ScheduleProfile>, AirschedError>> + Send;

    /// Get all profiles, ordered by start time.
    fn get_all(&self) -> impl Future<Output = Result<Vec<ScheduleProfile>, AirschedError>> + Send;

    /// Overwrite an existing profile.
    fn update(
        &self,
        profile: ScheduleProfile,
    ) -> impl Future<Output = Result<ScheduleProfile, AirschedError>> + Send;

    /// Delete a profile by id. Deleting an absent id is a no-op.
    fn delete(&self, id: ProfileId) -> impl Future<Output = Result<(), AirschedError>> + Send;

    /// Live view of the full profile list, refreshed after every committed
    /// write. The channel never completes on its own.
    fn subscribe_all(&self) -> watch::Receiver<Vec<ScheduleProfile>>;
}
