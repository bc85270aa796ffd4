//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`AirschedError`] via `#[from]` (no `String` variants at the top level).
//! Adapters keep their library-specific sources behind the boxed
//! [`AirschedError::Storage`] variant.

/// Top-level error type shared by ports, services, and adapters.
#[derive(Debug, thiserror::Error)]
pub enum AirschedError {
    /// A profile failed domain validation; surfaced to the editing surface
    /// and never handed to the scheduler.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced profile no longer exists. Permanent — never retried.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The remote device is unreachable, timed out, or answered garbage.
    /// Transient — the job scheduler retries these with backoff.
    #[error("device connectivity error")]
    Connectivity(#[from] ConnectivityError),

    /// A persistence failure from whichever storage adapter is wired in.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl AirschedError {
    /// Whether retrying the failed operation later can reasonably succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }
}

/// Domain invariant violations detected before anything is persisted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A time-of-day string was not `HH:MM` within range.
    #[error("invalid time of day: {0:?}")]
    InvalidTime(String),

    /// A zone entry had an empty name.
    #[error("zone name must not be empty")]
    EmptyZoneName,

    /// Target temperature outside the unit's supported range.
    #[error("target temperature {0}°C outside supported range 16–32°C")]
    TemperatureOutOfRange(f32),

    /// Fixed fan level outside the unit's supported range.
    #[error("fan level {0} outside supported range 1–5")]
    FanLevelOutOfRange(u8),
}

/// A lookup by id came back empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// What kind of thing was being looked up (e.g. `"ScheduleProfile"`).
    pub entity: &'static str,
    /// The identifier that missed.
    pub id: String,
}

/// Transient failures talking to the physical unit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectivityError {
    /// The request did not complete within the configured deadline.
    #[error("device request timed out")]
    Timeout,

    /// The device could not be reached at all.
    #[error("device unreachable: {0}")]
    Unreachable(String),

    /// The device answered, but not in the expected key=value shape.
    #[error("malformed device response: {0}")]
    Protocol(String),
}
