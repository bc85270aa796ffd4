//! Schedule executor — the code that runs when a deferred job fires.
//!
//! Loads the profile, checks it is still eligible, applies device state, and
//! updates the profile's activation per its lifecycle. The executor never
//! retries internally: it reports [`JobOutcome::Retry`] for transient
//! failures and leaves the backoff bookkeeping to the scheduler.

use airsched_domain::control::{ControlState, Zone};
use airsched_domain::error::AirschedError;
use airsched_domain::id::ProfileId;
use airsched_domain::profile::ScheduleProfile;

use crate::ports::{DeviceControl, JobOutcome, JobPurpose, JobRunner, ProfileRepository};

/// Fire-time state machine over a profile repository and a device.
#[derive(Debug, Clone)]
pub struct ScheduleExecutor<R, D> {
    repo: R,
    device: D,
}

impl<R, D> ScheduleExecutor<R, D>
where
    R: ProfileRepository,
    D: DeviceControl,
{
    pub fn new(repo: R, device: D) -> Self {
        Self { repo, device }
    }

    /// Push a profile's control state and zone settings to the device.
    ///
    /// Profile zones are matched to the device's current zones by name; names
    /// the device no longer knows are ignored. Applying an already-applied
    /// state is harmless, so this is also the fallback sweep's apply path.
    ///
    /// # Errors
    ///
    /// Propagates [`AirschedError::Connectivity`] from any device call.
    pub async fn apply_profile(&self, profile: &ScheduleProfile) -> Result<(), AirschedError> {
        self.device.apply_control_state(profile.control).await?;
        if !profile.zones.is_empty() {
            let current = self.device.read_zone_state().await?;
            let merged = merge_zones(&current, &profile.zones);
            self.device.apply_zone_state(merged).await?;
        }
        Ok(())
    }

    async fn run_start(&self, id: ProfileId) -> JobOutcome {
        let profile = match self.repo.get_by_id(id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                tracing::error!(profile_id = %id, "profile vanished before start fire");
                return JobOutcome::Failure;
            }
            Err(err) => return outcome_for(id, JobPurpose::Start, &err),
        };

        if !profile.is_active {
            // Deactivated after the job was armed; a stale trigger is not an
            // error, so the scheduler must not retry it.
            tracing::debug!(profile_id = %id, "profile inactive at start fire, skipping");
            return JobOutcome::Success;
        }

        if let Err(err) = self.apply_profile(&profile).await {
            return outcome_for(id, JobPurpose::Start, &err);
        }

        if profile.end_time.is_none() {
            // One-shot profile, fully consumed. Re-fetch before mutating:
            // the copy applied above is stale across the device awaits.
            match self.deactivate(id).await {
                Ok(()) => {
                    tracing::info!(profile_id = %id, "start fired, one-shot profile deactivated");
                }
                Err(err) => return outcome_for(id, JobPurpose::Start, &err),
            }
        } else {
            tracing::info!(profile_id = %id, "start fired, profile stays active until end time");
        }

        JobOutcome::Success
    }

    async fn run_end(&self, id: ProfileId) -> JobOutcome {
        // An end job always runs while its profile exists, even if the
        // profile is currently inactive: it turns off what start turned on.
        match self.repo.get_by_id(id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::error!(profile_id = %id, "profile vanished before end fire");
                return JobOutcome::Failure;
            }
            Err(err) => return outcome_for(id, JobPurpose::End, &err),
        }

        if let Err(err) = self.device.apply_control_state(ControlState::off()).await {
            return outcome_for(id, JobPurpose::End, &err);
        }

        match self.deactivate(id).await {
            Ok(()) => {
                tracing::info!(profile_id = %id, "end fired, unit powered off and profile deactivated");
                JobOutcome::Success
            }
            Err(err) => outcome_for(id, JobPurpose::End, &err),
        }
    }

    async fn deactivate(&self, id: ProfileId) -> Result<(), AirschedError> {
        if let Some(mut current) = self.repo.get_by_id(id).await? {
            current.is_active = false;
            self.repo.update(current).await?;
        }
        Ok(())
    }
}

impl<R, D> JobRunner for ScheduleExecutor<R, D>
where
    R: ProfileRepository,
    D: DeviceControl,
{
    async fn run(&self, profile_id: ProfileId, purpose: JobPurpose) -> JobOutcome {
        match purpose {
            JobPurpose::Start => self.run_start(profile_id).await,
            JobPurpose::End => self.run_end(profile_id).await,
        }
    }
}

/// Merge desired zone settings into the device's current zone list by name.
fn merge_zones(current: &[Zone], desired: &[Zone]) -> Vec<Zone> {
    current
        .iter()
        .map(|zone| {
            let on = desired
                .iter()
                .find(|d| d.name == zone.name)
                .map_or(zone.on, |d| d.on);
            Zone::new(zone.name.clone(), on)
        })
        .collect()
}

fn outcome_for(id: ProfileId, purpose: JobPurpose, err: &AirschedError) -> JobOutcome {
    match err {
        // Storage hiccups retry alongside connectivity: the profile row is
        // still there, the attempt just could not reach it.
        AirschedError::Connectivity(_) | AirschedError::Storage(_) => {
            tracing::warn!(profile_id = %id, %purpose, error = %err, "transient failure, will retry");
            JobOutcome::Retry
        }
        AirschedError::NotFound(_) | AirschedError::Validation(_) => {
            tracing::error!(profile_id = %id, %purpose, error = %err, "permanent failure");
            JobOutcome::Failure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDevice, InMemoryProfileRepo};
    use airsched_domain::control::Power;
    use airsched_domain::error::ConnectivityError;

    fn profile(end: Option<&str>) -> ScheduleProfile {
        let mut builder = ScheduleProfile::builder()
            .start_time("07:00".parse().unwrap())
            .zone(Zone::new("Living Room", true))
            .zone(Zone::new("Bedroom", false));
        if let Some(end) = end {
            builder = builder.end_time(end.parse().unwrap());
        }
        builder.build().unwrap()
    }

    async fn setup(end: Option<&str>) -> (InMemoryProfileRepo, FakeDevice, ProfileId) {
        let repo = InMemoryProfileRepo::default();
        let saved = repo.create(profile(end)).await.unwrap();
        let device = FakeDevice::with_zones(vec![
            Zone::new("Living Room", false),
            Zone::new("Bedroom", true),
            Zone::new("Kitchen", true),
        ]);
        (repo, device, saved.id)
    }

    #[tokio::test]
    async fn should_deactivate_one_shot_profile_after_start_fire() {
        let (repo, device, id) = setup(None).await;
        let executor = ScheduleExecutor::new(repo.clone(), device.clone());

        let outcome = executor.run(id, JobPurpose::Start).await;

        assert_eq!(outcome, JobOutcome::Success);
        assert!(!repo.get_by_id(id).await.unwrap().unwrap().is_active);
        assert_eq!(device.last_control().unwrap().power, Power::On);
    }

    #[tokio::test]
    async fn should_keep_profile_active_when_end_time_present() {
        let (repo, device, id) = setup(Some("22:00")).await;
        let executor = ScheduleExecutor::new(repo.clone(), device.clone());

        let outcome = executor.run(id, JobPurpose::Start).await;

        assert_eq!(outcome, JobOutcome::Success);
        assert!(repo.get_by_id(id).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn should_merge_zones_by_name_and_ignore_unknown_names() {
        let (repo, device, id) = setup(Some("22:00")).await;
        let mut stored = repo.get_by_id(id).await.unwrap().unwrap();
        stored.zones.push(Zone::new("Sunroom", true)); // removed from the unit
        repo.update(stored).await.unwrap();
        let executor = ScheduleExecutor::new(repo, device.clone());

        executor.run(id, JobPurpose::Start).await;

        let applied = device.last_zones().unwrap();
        assert_eq!(
            applied,
            vec![
                Zone::new("Living Room", true),
                Zone::new("Bedroom", false),
                Zone::new("Kitchen", true), // untouched, not named by profile
            ]
        );
    }

    #[tokio::test]
    async fn should_skip_start_fire_for_inactive_profile_without_error() {
        let (repo, device, id) = setup(None).await;
        let mut stored = repo.get_by_id(id).await.unwrap().unwrap();
        stored.is_active = false;
        repo.update(stored).await.unwrap();
        let executor = ScheduleExecutor::new(repo, device.clone());

        let outcome = executor.run(id, JobPurpose::Start).await;

        assert_eq!(outcome, JobOutcome::Success);
        assert!(device.last_control().is_none(), "device must not be touched");
    }

    #[tokio::test]
    async fn should_power_off_and_deactivate_on_end_fire() {
        let (repo, device, id) = setup(Some("22:00")).await;
        let executor = ScheduleExecutor::new(repo.clone(), device.clone());

        let outcome = executor.run(id, JobPurpose::End).await;

        assert_eq!(outcome, JobOutcome::Success);
        assert_eq!(device.last_control().unwrap().power, Power::Off);
        assert!(!repo.get_by_id(id).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn should_run_end_fire_even_when_profile_already_inactive() {
        let (repo, device, id) = setup(Some("22:00")).await;
        let mut stored = repo.get_by_id(id).await.unwrap().unwrap();
        stored.is_active = false;
        repo.update(stored).await.unwrap();
        let executor = ScheduleExecutor::new(repo.clone(), device.clone());

        let outcome = executor.run(id, JobPurpose::End).await;

        assert_eq!(outcome, JobOutcome::Success);
        assert_eq!(device.last_control().unwrap().power, Power::Off);
        assert!(!repo.get_by_id(id).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn should_report_retry_and_leave_activation_untouched_on_connectivity_error() {
        let (repo, device, id) = setup(None).await;
        device.fail_next(ConnectivityError::Timeout);
        let executor = ScheduleExecutor::new(repo.clone(), device);

        let outcome = executor.run(id, JobPurpose::Start).await;

        assert_eq!(outcome, JobOutcome::Retry);
        assert!(repo.get_by_id(id).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn should_report_permanent_failure_when_profile_missing() {
        let (repo, device, _) = setup(None).await;
        let executor = ScheduleExecutor::new(repo, device);

        let outcome = executor.run(ProfileId::new(999), JobPurpose::Start).await;

        assert_eq!(outcome, JobOutcome::Failure);
    }

    #[tokio::test]
    async fn should_report_permanent_failure_on_end_fire_for_missing_profile() {
        let (repo, device, _) = setup(Some("22:00")).await;
        let executor = ScheduleExecutor::new(repo, device.clone());

        let outcome = executor.run(ProfileId::new(999), JobPurpose::End).await;

        assert_eq!(outcome, JobOutcome::Failure);
        assert!(device.last_control().is_none());
    }
}
