//! Times of day and the occurrence calculator.
//!
//! The calculator is pure wall-clock arithmetic: given a profile's start/end
//! times and "now", it produces the next absolute instants at which the
//! profile should fire. Calling it repeatedly with the same inputs yields the
//! same answers; it does no IO and keeps no state.
//!
//! All instants carry a [`FixedOffset`] — the clock port captures the local
//! UTC offset once per call, which keeps the math total (no DST-gap lookups
//! in the middle of a calculation).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Timelike};

use crate::error::ValidationError;

/// A local time of day with minute resolution, displayed as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Build from hour and minute.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTime`] when `hour >= 24` or
    /// `minute >= 60`.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ValidationError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidTime(format!("{hour:02}:{minute:02}")))
    }

    /// The time-of-day of `instant`, truncated to the minute.
    ///
    /// Used by the fallback sweep to compare profile start times against the
    /// current wall clock.
    #[must_use]
    pub fn from_instant(instant: DateTime<FixedOffset>) -> Self {
        Self(instant.time().with_second(0).unwrap_or(instant.time()))
    }

    #[must_use]
    pub fn hour(self) -> u32 {
        self.0.hour()
    }

    #[must_use]
    pub fn minute(self) -> u32 {
        self.0.minute()
    }

    fn on_date(self, date: NaiveDate, offset: FixedOffset) -> DateTime<FixedOffset> {
        let local = date.and_time(self.0);
        let utc = local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
        DateTime::from_naive_utc_and_offset(utc, offset)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s, "%H:%M")
            .map(Self)
            .map_err(|_| ValidationError::InvalidTime(s.to_string()))
    }
}

impl serde::Serialize for TimeOfDay {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for TimeOfDay {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The next instant at which a profile with this start time fires.
///
/// The start time is interpreted on `now`'s calendar date; if that instant is
/// at or before `now`, the occurrence rolls forward to tomorrow.
#[must_use]
pub fn next_start_occurrence(
    start: TimeOfDay,
    now: DateTime<FixedOffset>,
) -> DateTime<FixedOffset> {
    let mut candidate = start.on_date(now.date_naive(), *now.offset());
    if candidate <= now {
        candidate += TimeDelta::days(1);
    }
    candidate
}

/// The next instant at which a profile's end action fires.
///
/// When `end <= start` on the clock the window crosses midnight and the
/// candidate moves one day past the start's date. An equal pair is defined as
/// a full 24-hour window, not a zero-length one. Independently of that, a
/// candidate at or before `now` rolls forward one more day.
#[must_use]
pub fn next_end_occurrence(
    start: TimeOfDay,
    end: TimeOfDay,
    now: DateTime<FixedOffset>,
) -> DateTime<FixedOffset> {
    let mut candidate = end.on_date(now.date_naive(), *now.offset());
    if end <= start {
        candidate += TimeDelta::days(1);
    }
    if candidate <= now {
        candidate += TimeDelta::days(1);
    }
    candidate
}
