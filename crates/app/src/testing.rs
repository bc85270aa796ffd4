//! Shared in-memory fakes for this crate's tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use airsched_domain::control::{ControlState, Zone};
use airsched_domain::error::{AirschedError, ConnectivityError};
use airsched_domain::id::ProfileId;
use airsched_domain::profile::ScheduleProfile;
use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::watch;

use crate::ports::{Clock, DeviceControl, JobPurpose, JobScheduler, ProfileRepository};

/// Clonable in-memory [`ProfileRepository`].
#[derive(Clone)]
pub struct InMemoryProfileRepo {
    inner: Arc<RepoInner>,
}

struct RepoInner {
    store: Mutex<HashMap<ProfileId, ScheduleProfile>>,
    next_id: AtomicI64,
    tx: watch::Sender<Vec<ScheduleProfile>>,
}

impl Default for InMemoryProfileRepo {
    fn default() -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(RepoInner {
                store: Mutex::new(HashMap::new()),
                next_id: AtomicI64::new(1),
                tx,
            }),
        }
    }
}

impl InMemoryProfileRepo {
    fn snapshot(&self) -> Vec<ScheduleProfile> {
        let mut all: Vec<ScheduleProfile> =
            self.inner.store.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|p| (p.start_time, p.id));
        all
    }

    fn publish(&self) {
        self.inner.tx.send_replace(self.snapshot());
    }
}

impl ProfileRepository for InMemoryProfileRepo {
    async fn create(&self, mut profile: ScheduleProfile) -> Result<ScheduleProfile, AirschedError> {
        profile.id = ProfileId::new(self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        self.inner
            .store
            .lock()
            .unwrap()
            .insert(profile.id, profile.clone());
        self.publish();
        Ok(profile)
    }

    async fn get_by_id(&self, id: ProfileId) -> Result<Option<ScheduleProfile>, AirschedError> {
        Ok(self.inner.store.lock().unwrap().get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<ScheduleProfile>, AirschedError> {
        Ok(self.snapshot())
    }

    async fn update(&self, profile: ScheduleProfile) -> Result<ScheduleProfile, AirschedError> {
        self.inner
            .store
            .lock()
            .unwrap()
            .insert(profile.id, profile.clone());
        self.publish();
        Ok(profile)
    }

    async fn delete(&self, id: ProfileId) -> Result<(), AirschedError> {
        self.inner.store.lock().unwrap().remove(&id);
        self.publish();
        Ok(())
    }

    fn subscribe_all(&self) -> watch::Receiver<Vec<ScheduleProfile>> {
        self.inner.tx.subscribe()
    }
}

/// Clonable [`DeviceControl`] fake that records the last applied state and
/// can fail its next call on demand.
#[derive(Clone, Default)]
pub struct FakeDevice {
    inner: Arc<DeviceInner>,
}

#[derive(Default)]
struct DeviceInner {
    control: Mutex<Option<ControlState>>,
    zones: Mutex<Vec<Zone>>,
    applied_zones: Mutex<Option<Vec<Zone>>>,
    fail_next: Mutex<Option<ConnectivityError>>,
}

impl FakeDevice {
    pub fn with_zones(zones: Vec<Zone>) -> Self {
        let device = Self::default();
        *device.inner.zones.lock().unwrap() = zones;
        device
    }

    pub fn fail_next(&self, err: ConnectivityError) {
        *self.inner.fail_next.lock().unwrap() = Some(err);
    }

    pub fn last_control(&self) -> Option<ControlState> {
        *self.inner.control.lock().unwrap()
    }

    pub fn last_zones(&self) -> Option<Vec<Zone>> {
        self.inner.applied_zones.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<(), AirschedError> {
        match self.inner.fail_next.lock().unwrap().take() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

impl DeviceControl for FakeDevice {
    async fn read_control_state(&self) -> Result<ControlState, AirschedError> {
        self.check_failure()?;
        Ok(self.inner.control.lock().unwrap().unwrap_or_else(ControlState::off))
    }

    async fn apply_control_state(&self, state: ControlState) -> Result<(), AirschedError> {
        self.check_failure()?;
        *self.inner.control.lock().unwrap() = Some(state);
        Ok(())
    }

    async fn read_zone_state(&self) -> Result<Vec<Zone>, AirschedError> {
        self.check_failure()?;
        Ok(self.inner.zones.lock().unwrap().clone())
    }

    async fn apply_zone_state(&self, zones: Vec<Zone>) -> Result<(), AirschedError> {
        self.check_failure()?;
        *self.inner.zones.lock().unwrap() = zones.clone();
        *self.inner.applied_zones.lock().unwrap() = Some(zones);
        Ok(())
    }
}

/// Clonable [`JobScheduler`] fake exposing its pending slots.
#[derive(Clone, Default)]
pub struct RecordingJobScheduler {
    slots: Arc<Mutex<HashMap<(ProfileId, JobPurpose), DateTime<Utc>>>>,
}

impl RecordingJobScheduler {
    pub fn pending(&self) -> Vec<(ProfileId, JobPurpose, DateTime<Utc>)> {
        let mut all: Vec<_> = self
            .slots
            .lock()
            .unwrap()
            .iter()
            .map(|(&(id, purpose), &at)| (id, purpose, at))
            .collect();
        all.sort();
        all
    }

    pub fn fire_at(&self, id: ProfileId, purpose: JobPurpose) -> Option<DateTime<Utc>> {
        self.slots.lock().unwrap().get(&(id, purpose)).copied()
    }
}

impl JobScheduler for RecordingJobScheduler {
    async fn schedule_once(
        &self,
        profile_id: ProfileId,
        purpose: JobPurpose,
        fire_at: DateTime<Utc>,
    ) -> Result<(), AirschedError> {
        self.slots
            .lock()
            .unwrap()
            .insert((profile_id, purpose), fire_at);
        Ok(())
    }

    async fn cancel(&self, profile_id: ProfileId, purpose: JobPurpose) -> Result<(), AirschedError> {
        self.slots.lock().unwrap().remove(&(profile_id, purpose));
        Ok(())
    }
}

/// A [`Clock`] pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    pub fn at(rfc3339: &str) -> Self {
        Self(rfc3339.parse().unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
