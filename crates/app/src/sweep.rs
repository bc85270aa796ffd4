//! Periodic fallback sweep — a best-effort backstop, not the primary firing
//! mechanism.
//!
//! Wakes on a fixed interval and applies any active profile whose start time
//! matches the current wall clock truncated to the minute. This recovers
//! from a cleared job table, but an interval coarser than one minute can
//! skip a match entirely. Failures are logged and swallowed per profile so
//! one bad profile never blocks the sweep of the others. The sweep does not
//! touch activation state; the durable job path owns the lifecycle.

use std::time::Duration;

use airsched_domain::time::TimeOfDay;
use tokio::time::MissedTickBehavior;

use crate::executor::ScheduleExecutor;
use crate::ports::{Clock, DeviceControl, ProfileRepository};

/// Minute-match sweep over all stored profiles.
#[derive(Debug, Clone)]
pub struct FallbackSweep<R, D, C> {
    repo: R,
    executor: ScheduleExecutor<R, D>,
    clock: C,
    interval: Duration,
}

impl<R, D, C> FallbackSweep<R, D, C>
where
    R: ProfileRepository + Clone,
    D: DeviceControl,
    C: Clock,
{
    pub fn new(repo: R, device: D, clock: C, interval: Duration) -> Self {
        let executor = ScheduleExecutor::new(repo.clone(), device);
        Self {
            repo,
            executor,
            clock,
            interval,
        }
    }

    /// Run the sweep loop forever. Intended to be `tokio::spawn`-ed from the
    /// composition root.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(interval_secs = self.interval.as_secs(), "fallback sweep started");
        loop {
            ticker.tick().await;
            self.sweep_once().await;
        }
    }

    /// A single pass: apply every active profile whose start time matches
    /// the current minute.
    pub async fn sweep_once(&self) {
        let minute = TimeOfDay::from_instant(self.clock.now());
        let profiles = match self.repo.get_all().await {
            Ok(profiles) => profiles,
            Err(err) => {
                tracing::warn!(error = %err, "fallback sweep could not list profiles");
                return;
            }
        };

        for profile in profiles {
            if !profile.is_active || profile.start_time != minute {
                continue;
            }
            match self.executor.apply_profile(&profile).await {
                Ok(()) => {
                    tracing::info!(profile_id = %profile.id, "fallback sweep applied profile");
                }
                Err(err) => {
                    tracing::warn!(
                        profile_id = %profile.id,
                        error = %err,
                        "fallback sweep failed to apply profile"
                    );
                }
            }
        }
    }
}
