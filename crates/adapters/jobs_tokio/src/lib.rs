//! # airsched-adapter-jobs-tokio
//!
//! Durable deferred-job scheduler: a persistent slot table plus in-process
//! tokio timer tasks that re-hydrate from it on startup.
//!
//! Each pending job is one row in a [`JobStore`] and (while the process is
//! up) one spawned timer task. Re-arming a `(profile id, purpose)` pair
//! replaces both atomically with respect to the slot map, so at most one
//! job is ever pending per pair. A fired job waits for network
//! availability, consumes its slot, and then runs the [`JobRunner`] body on
//! a detached task — cancellation that loses the race against firing cannot
//! abort an execution already in flight. Transient outcomes are re-attempted
//! with doubling backoff up to the retry policy's limit.
//!
//! The durable row is cleared only once the outcome settles (success or
//! permanent failure). A restart anywhere in the fire/retry window therefore
//! finds the row on [`TokioJobScheduler::rehydrate`] and re-fires the owed
//! occurrence instead of dropping it.
//!
//! ## Dependency rule
//! Depends on `airsched-app` (port traits) and `airsched-domain` only.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use airsched_app::ports::{
    Clock, JobOutcome, JobPurpose, JobRunner, JobScheduler, JobStore, NetworkMonitor, PendingJob,
};
use airsched_domain::error::AirschedError;
use airsched_domain::id::ProfileId;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

type SlotKey = (ProfileId, JobPurpose);

struct Slot {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Backoff parameters for jobs that report [`JobOutcome::Retry`].
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Delay before the second attempt; doubles per further attempt.
    pub initial_backoff: Duration,
    /// Total attempts before the occurrence is abandoned.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_secs(30),
            max_attempts: 5,
        }
    }
}

/// Durable [`JobScheduler`] backed by a [`JobStore`] and tokio timers.
pub struct TokioJobScheduler<S, N, R, C> {
    inner: Arc<Inner<S, N, R, C>>,
}

impl<S, N, R, C> Clone for TokioJobScheduler<S, N, R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<S, N, R, C> {
    store: S,
    network: N,
    runner: R,
    clock: C,
    retry: RetryPolicy,
    slots: Mutex<HashMap<SlotKey, Slot>>,
    generations: AtomicU64,
}

impl<S, N, R, C> TokioJobScheduler<S, N, R, C>
where
    S: JobStore + 'static,
    N: NetworkMonitor + 'static,
    R: JobRunner + 'static,
    C: Clock + 'static,
{
    pub fn new(store: S, network: N, runner: R, clock: C, retry: RetryPolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                network,
                runner,
                clock,
                retry,
                slots: Mutex::new(HashMap::new()),
                generations: AtomicU64::new(0),
            }),
        }
    }

    /// Re-arm every persisted slot after a restart.
    ///
    /// Slots whose instant has already passed fire once immediately — an
    /// occurrence missed while the process was down is caught up, not
    /// dropped. The composition root follows this with a full re-arm from
    /// profile state, whose replace semantics win for future slots.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the slot table cannot be read.
    pub async fn rehydrate(&self) -> Result<usize, AirschedError> {
        let jobs = self.inner.store.list_all().await?;
        let now = self.inner.clock.now().to_utc();
        let count = jobs.len();
        for job in jobs {
            if job.fire_at <= now {
                tracing::info!(
                    profile_id = %job.profile_id,
                    purpose = %job.purpose,
                    fire_at = %job.fire_at,
                    "catching up occurrence missed while down"
                );
            }
            self.arm(job);
        }
        tracing::info!(slots = count, "re-hydrated pending jobs");
        Ok(count)
    }

    /// Spawn (or replace) the timer task for a slot.
    fn arm(&self, job: PendingJob) {
        let key = (job.profile_id, job.purpose);
        let generation = self.inner.generations.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);

        // The lock is held across the spawn so an already-overdue task
        // cannot touch the map before its own entry is in it.
        let mut slots = self.inner.slots.lock().unwrap_or_else(|e| e.into_inner());
        let handle = tokio::spawn(async move {
            let delay = (job.fire_at - inner.clock.now().to_utc())
                .to_std()
                .unwrap_or(Duration::ZERO);
            tokio::time::sleep(delay).await;
            inner.network.wait_until_online().await;

            // Consume the slot; a task that lost a replace or cancel race
            // stops here. From this point a cancel() arriving late finds
            // nothing to abort, and the body below runs detached anyway.
            {
                let mut slots = inner.slots.lock().unwrap_or_else(|e| e.into_inner());
                if slots
                    .get(&key)
                    .is_some_and(|slot| slot.generation == generation)
                {
                    slots.remove(&key);
                } else {
                    return;
                }
            }

            // The durable row stays until the outcome settles, so a restart
            // during the retry window re-fires this occurrence. remove_exact
            // leaves a row re-armed mid-retry alone.
            tokio::spawn(async move {
                if run_with_retry(&inner, job.profile_id, job.purpose).await {
                    if let Err(err) = inner.store.remove_exact(job).await {
                        tracing::warn!(
                            profile_id = %job.profile_id,
                            purpose = %job.purpose,
                            error = %err,
                            "failed to clear settled slot"
                        );
                    }
                }
            });
        });

        if let Some(old) = slots.insert(key, Slot { generation, handle }) {
            old.handle.abort();
        }
    }
}

/// Drive a fired occurrence to its outcome, backing off between attempts.
///
/// Returns whether the occurrence settled (success or permanent failure).
/// Giving up after exhausting transient retries leaves it unsettled; the
/// durable row stays behind for the next rehydrate to pick up.
async fn run_with_retry<S, N, R, C>(
    inner: &Inner<S, N, R, C>,
    id: ProfileId,
    purpose: JobPurpose,
) -> bool
where
    S: JobStore,
    N: NetworkMonitor,
    R: JobRunner,
    C: Clock,
{
    let mut backoff = inner.retry.initial_backoff;
    for attempt in 1..=inner.retry.max_attempts {
        match inner.runner.run(id, purpose).await {
            JobOutcome::Success => {
                tracing::debug!(profile_id = %id, %purpose, attempt, "job completed");
                return true;
            }
            JobOutcome::Failure => {
                tracing::error!(profile_id = %id, %purpose, attempt, "job failed permanently");
                return true;
            }
            JobOutcome::Retry => {
                if attempt == inner.retry.max_attempts {
                    tracing::error!(
                        profile_id = %id,
                        %purpose,
                        attempts = attempt,
                        "job still failing transiently, giving up until next restart"
                    );
                    return false;
                }
                tracing::warn!(
                    profile_id = %id,
                    %purpose,
                    attempt,
                    backoff_secs = backoff.as_secs(),
                    "job reported transient failure, backing off"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
        }
    }
    false
}

impl<S, N, R, C> JobScheduler for TokioJobScheduler<S, N, R, C>
where
    S: JobStore + 'static,
    N: NetworkMonitor + 'static,
    R: JobRunner + 'static,
    C: Clock + 'static,
{
    async fn schedule_once(
        &self,
        profile_id: ProfileId,
        purpose: JobPurpose,
        fire_at: DateTime<Utc>,
    ) -> Result<(), AirschedError> {
        let job = PendingJob {
            profile_id,
            purpose,
            fire_at,
        };
        self.inner.store.upsert(job).await?;
        self.arm(job);
        tracing::debug!(%profile_id, %purpose, %fire_at, "job armed");
        Ok(())
    }

    async fn cancel(&self, profile_id: ProfileId, purpose: JobPurpose) -> Result<(), AirschedError> {
        self.inner.store.remove(profile_id, purpose).await?;
        let slot = {
            let mut slots = self.inner.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots.remove(&(profile_id, purpose))
        };
        if let Some(slot) = slot {
            slot.handle.abort();
            tracing::debug!(%profile_id, %purpose, "job cancelled");
        }
        Ok(())
    }
}
